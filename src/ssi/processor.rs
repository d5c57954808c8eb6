//! Directive processor
//!
//! Each expansion runs three passes over the text: includes, then echoes,
//! then conditionals. An included file is expanded completely (with its own
//! variables) before it is spliced into the including text, so the later
//! passes of the parent also see the spliced-in content.

use super::error::IncludeError;
use super::parser::{scan, Conditional, Echo, Include, Segment};
use super::variables::VariableSet;
use crate::http::RequestContext;
use crate::logger;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files currently being expanded, outermost first
#[derive(Debug)]
struct IncludeChain {
    active: Vec<PathBuf>,
    max_depth: usize,
}

impl IncludeChain {
    fn new(root: PathBuf, max_depth: usize) -> Self {
        Self {
            active: vec![root],
            max_depth,
        }
    }

    /// Number of includes between the top-level file and the innermost one
    fn depth(&self) -> usize {
        self.active.len().saturating_sub(1)
    }

    fn enter(&mut self, file: PathBuf, virtual_path: &str) -> Result<(), IncludeError> {
        if self.active.contains(&file) {
            return Err(IncludeError::Cycle {
                path: virtual_path.to_string(),
            });
        }
        if self.depth() >= self.max_depth {
            return Err(IncludeError::DepthExceeded {
                path: virtual_path.to_string(),
                limit: self.max_depth,
            });
        }
        self.active.push(file);
        Ok(())
    }

    fn leave(&mut self) {
        self.active.pop();
    }
}

/// Expands SSI directives for one request
pub struct Expander<'a> {
    ctx: &'a RequestContext,
    base_dir: &'a Path,
    max_depth: usize,
}

impl<'a> Expander<'a> {
    /// `base_dir` anchors every `include virtual=` path, whatever the
    /// location of the including file.
    pub const fn new(ctx: &'a RequestContext, base_dir: &'a Path, max_depth: usize) -> Self {
        Self {
            ctx,
            base_dir,
            max_depth,
        }
    }

    /// Expand every directive in `text`, which was read from `file_path`.
    ///
    /// Never fails; include problems become HTML comments in the output.
    pub async fn expand(&self, text: &str, file_path: &Path) -> String {
        let mut chain = IncludeChain::new(file_identity(file_path).await, self.max_depth);
        self.expand_in_chain(text, file_path, &mut chain).await
    }

    async fn expand_in_chain(
        &self,
        text: &str,
        file_path: &Path,
        chain: &mut IncludeChain,
    ) -> String {
        let variables = VariableSet::resolve(file_path, self.ctx).await;
        let text = self.expand_includes(text, chain).await;
        let text = expand_echoes(&text, &variables);
        expand_conditionals(&text, &variables)
    }

    async fn expand_includes(&self, text: &str, chain: &mut IncludeChain) -> String {
        let mut out = String::with_capacity(text.len());
        for segment in scan::<Include>(text) {
            match segment {
                Segment::Text(literal) => out.push_str(literal),
                Segment::Directive(Include { path }) => match self.include(path, chain).await {
                    Ok(expanded) => out.push_str(&expanded),
                    Err(e) => {
                        logger::log_warning(&format!("[SSI] {e} ({})", self.ctx.uri));
                        out.push_str(&e.to_comment());
                    }
                },
            }
        }
        out
    }

    async fn include(
        &self,
        virtual_path: &str,
        chain: &mut IncludeChain,
    ) -> Result<String, IncludeError> {
        let full_path = resolve_include_path(self.base_dir, virtual_path);
        chain.enter(file_identity(&full_path).await, virtual_path)?;

        let result = match fs::read(&full_path).await {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                Ok(Box::pin(self.expand_in_chain(&content, &full_path, chain)).await)
            }
            Err(e) => Err(IncludeError::from_io(virtual_path, e)),
        };

        chain.leave();
        result
    }
}

/// Join an include path onto the base directory; a leading `/` does not make
/// the path absolute.
fn resolve_include_path(base_dir: &Path, virtual_path: &str) -> PathBuf {
    base_dir.join(virtual_path.trim_start_matches('/'))
}

/// Canonical path when the file exists, otherwise the path as given
async fn file_identity(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}

fn expand_echoes(text: &str, variables: &VariableSet) -> String {
    scan::<Echo>(text).fold(String::with_capacity(text.len()), |mut out, segment| {
        match segment {
            Segment::Text(literal) => out.push_str(literal),
            Segment::Directive(Echo { var }) => out.push_str(variables.lookup(var)),
        }
        out
    })
}

fn expand_conditionals(text: &str, variables: &VariableSet) -> String {
    scan::<Conditional>(text).fold(String::with_capacity(text.len()), |mut out, segment| {
        match segment {
            Segment::Text(literal) => out.push_str(literal),
            Segment::Directive(cond) => out.push_str(cond.select(variables.lookup(cond.var))),
        }
        out
    })
}
