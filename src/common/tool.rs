use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Variables layered on top of the inherited environment of a child process.
/// The parent's own environment is never touched.
pub type EnvOverrides = BTreeMap<String, PathBuf>;

/// One external process invocation, fully described before it is launched.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ToolCommand {
    pub descr: &'static str,
    pub program: String,
    pub args: Vec<OsString>,

    /// The child's working directory. `None` inherits ours.
    pub dir: Option<PathBuf>,

    pub env: EnvOverrides,
}
impl ToolCommand {
    pub fn new(descr: &'static str, program: impl Into<String>) -> Self {
        Self {
            descr,
            program: program.into(),
            args: vec![],
            dir: None,
            env: EnvOverrides::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }
    pub fn envs(mut self, env: &EnvOverrides) -> Self {
        self.env
            .extend(env.iter().map(|(name, val)| (name.clone(), val.clone())));
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    fn expression(&self) -> duct::Expression {
        let mut expr = duct::cmd(self.program.as_str(), self.args.iter().cloned());
        if let Some(dir) = &self.dir {
            expr = expr.dir(dir.clone());
        }
        for (name, val) in self.env.iter() {
            expr = expr.env(name.as_str(), val.clone().into_os_string());
        }
        expr
    }

    /// Run to completion with inherited stdio. A launch failure and a non-zero exit status are both errors.
    pub fn run(&self) -> Result<()> {
        log::info!("{} command: {self}", self.descr);
        self.expression()
            .run()
            .with_context(|| format!("The {} command failed: {self}", self.descr))?;
        log::info!("{} done", self.descr);
        Ok(())
    }

    /// Run to completion and capture stdout, with the trailing newline trimmed.
    pub fn read(&self) -> Result<String> {
        log::debug!("{} command: {self}", self.descr);
        let out = self
            .expression()
            .read()
            .with_context(|| format!("The {} command failed: {self}", self.descr))?;
        Ok(out)
    }
}
impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.dir {
            write!(f, "(in {}) ", dir.display())?;
        }
        for (name, val) in self.env.iter() {
            write!(f, "{name}={} ", val.display())?;
        }
        write!(f, "{}", self.program)?;
        for arg in self.args.iter() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
