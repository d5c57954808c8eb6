//! SSI variable resolution
//!
//! The vocabulary is closed. A directive naming anything outside it resolves
//! to an empty string.

use crate::http::RequestContext;
use chrono::{DateTime, Local, Utc};
use std::fmt;
use std::path::Path;

/// Layout of `DATE_LOCAL` and `LAST_MODIFIED`, e.g. `2024/3/9 9:05:07`
const LOCAL_TIME_FORMAT: &str = "%Y/%-m/%-d %-H:%M:%S";
/// RFC 1123 layout of `DATE_GMT`
const GMT_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A variable that `echo` and `if` directives can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    DateLocal,
    DateGmt,
    DocumentName,
    DocumentUri,
    LastModified,
    QueryString,
}

impl Variable {
    pub const ALL: [Self; 6] = [
        Self::DateLocal,
        Self::DateGmt,
        Self::DocumentName,
        Self::DocumentUri,
        Self::LastModified,
        Self::QueryString,
    ];

    /// Name as written in directives
    pub const fn name(self) -> &'static str {
        match self {
            Self::DateLocal => "DATE_LOCAL",
            Self::DateGmt => "DATE_GMT",
            Self::DocumentName => "DOCUMENT_NAME",
            Self::DocumentUri => "DOCUMENT_URI",
            Self::LastModified => "LAST_MODIFIED",
            Self::QueryString => "QUERY_STRING",
        }
    }

    /// Case-sensitive lookup by directive name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|var| var.name() == name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of every [`Variable`] for one processed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSet {
    date_local: String,
    date_gmt: String,
    document_name: String,
    document_uri: String,
    last_modified: String,
    query_string: String,
}

impl VariableSet {
    /// Compute the variables for `file_path` at the current instant.
    ///
    /// Never fails: a missing file reports the current time as its
    /// modification time.
    pub async fn resolve(file_path: &Path, ctx: &RequestContext) -> Self {
        let now = Local::now();
        let last_modified = match tokio::fs::metadata(file_path)
            .await
            .and_then(|meta| meta.modified())
        {
            Ok(mtime) => DateTime::<Local>::from(mtime),
            Err(_) => now,
        };
        Self::at(file_path, ctx, now, last_modified)
    }

    fn at(
        file_path: &Path,
        ctx: &RequestContext,
        now: DateTime<Local>,
        last_modified: DateTime<Local>,
    ) -> Self {
        Self {
            date_local: now.format(LOCAL_TIME_FORMAT).to_string(),
            date_gmt: now.with_timezone(&Utc).format(GMT_TIME_FORMAT).to_string(),
            document_name: file_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            document_uri: ctx.uri.clone(),
            last_modified: last_modified.format(LOCAL_TIME_FORMAT).to_string(),
            query_string: ctx.query_string().to_string(),
        }
    }

    pub fn get(&self, var: Variable) -> &str {
        match var {
            Variable::DateLocal => &self.date_local,
            Variable::DateGmt => &self.date_gmt,
            Variable::DocumentName => &self.document_name,
            Variable::DocumentUri => &self.document_uri,
            Variable::LastModified => &self.last_modified,
            Variable::QueryString => &self.query_string,
        }
    }

    /// Value for a directive's variable name; unknown names yield ""
    pub fn lookup(&self, name: &str) -> &str {
        Variable::from_name(name).map_or("", |var| self.get(var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_names_round_trip() {
        for var in Variable::ALL {
            assert_eq!(Variable::from_name(var.name()), Some(var));
        }
        assert_eq!(Variable::from_name("date_local"), None);
        assert_eq!(Variable::from_name("HTTP_HOST"), None);
    }

    #[test]
    fn test_fixed_instant_formatting() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .unwrap()
            .with_timezone(&Local);
        let ctx = RequestContext::new("/news/today.shtml?id=7");
        let vars = VariableSet::at(Path::new("./news/today.shtml"), &ctx, now, now);

        assert_eq!(vars.get(Variable::DateGmt), "Sat, 09 Mar 2024 14:05:07 GMT");
        assert_eq!(
            vars.get(Variable::DateLocal),
            now.format("%Y/%-m/%-d %-H:%M:%S").to_string()
        );
        assert_eq!(vars.get(Variable::DocumentName), "today.shtml");
        assert_eq!(vars.get(Variable::DocumentUri), "/news/today.shtml?id=7");
        assert_eq!(vars.get(Variable::QueryString), "id=7");
    }

    #[test]
    fn test_local_time_is_not_zero_padded() {
        let morning = Local.with_ymd_and_hms(2024, 3, 9, 9, 5, 7).unwrap();
        let ctx = RequestContext::new("/");
        let vars = VariableSet::at(Path::new("index.html"), &ctx, morning, morning);
        assert_eq!(vars.get(Variable::DateLocal), "2024/3/9 9:05:07");
        assert_eq!(vars.get(Variable::LastModified), "2024/3/9 9:05:07");

        let evening = Local.with_ymd_and_hms(2024, 11, 23, 21, 40, 0).unwrap();
        let vars = VariableSet::at(Path::new("index.html"), &ctx, evening, evening);
        assert_eq!(vars.get(Variable::DateLocal), "2024/11/23 21:40:00");
    }

    #[test]
    fn test_unknown_name_is_empty() {
        let ctx = RequestContext::new("/");
        let now = Local::now();
        let vars = VariableSet::at(Path::new("index.html"), &ctx, now, now);
        assert_eq!(vars.lookup("NOT_A_VARIABLE"), "");
        assert_eq!(vars.lookup("DOCUMENT_NAME"), "index.html");
    }

    #[tokio::test]
    async fn test_last_modified_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        let file = std::fs::File::create(&path).unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        file.set_modified(mtime).unwrap();
        drop(file);

        let ctx = RequestContext::new("/page.html");
        let vars = VariableSet::resolve(&path, &ctx).await;
        let expected = DateTime::<Local>::from(mtime)
            .format("%Y/%-m/%-d %-H:%M:%S")
            .to_string();
        assert_eq!(vars.get(Variable::LastModified), expected);
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_now() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.html");
        let ctx = RequestContext::new("/gone.html");

        let vars = VariableSet::resolve(&path, &ctx).await;
        assert_eq!(
            vars.get(Variable::LastModified),
            vars.get(Variable::DateLocal)
        );
        assert_eq!(vars.get(Variable::DocumentName), "gone.html");
    }
}
