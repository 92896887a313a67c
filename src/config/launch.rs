//! Launch command for the engine process.
//!
//! The session only needs a program and its arguments. [`CoreNlpLaunch`]
//! assembles the usual `java ... StanfordCoreNLP -props <file>` line from
//! explicitly supplied parts; locating an installation on disk is left to the
//! caller.

use std::fmt;
use std::path::PathBuf;

use crate::{Error, Result};

/// Main class of the CoreNLP pipeline.
pub const CORENLP_MAIN_CLASS: &str = "edu.stanford.nlp.pipeline.StanfordCoreNLP";

/// A prebuilt command line: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    program: String,
    args: Vec<String>,
}

impl LaunchCommand {
    /// Create a command for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parse a shell-style command line (`java -Xmx3g -cp "a b.jar" ...`).
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = shell_words::split(line)
            .map_err(|e| Error::InvalidConfig(format!("unparseable launch command: {}", e)))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| Error::InvalidConfig("launch command is empty".into()))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Render as a single shell-quoted line.
    pub fn to_command_line(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_command_line())
    }
}

/// Assembles the standard CoreNLP launch command.
///
/// # Example
///
/// ```ignore
/// use libcorenlp::CoreNlpLaunch;
///
/// let launch = CoreNlpLaunch::new("default.properties")
///     .memory("3g")
///     .classpath(["stanford-corenlp-3.5.2.jar", "stanford-corenlp-3.5.2-models.jar"])
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct CoreNlpLaunch {
    java: PathBuf,
    memory: Option<String>,
    classpath: Vec<PathBuf>,
    main_class: String,
    properties: PathBuf,
}

impl CoreNlpLaunch {
    /// Start from a properties file; java defaults to `java` on PATH.
    pub fn new(properties: impl Into<PathBuf>) -> Self {
        Self {
            java: PathBuf::from("java"),
            memory: None,
            classpath: Vec::new(),
            main_class: CORENLP_MAIN_CLASS.to_string(),
            properties: properties.into(),
        }
    }

    /// Path to the java binary.
    pub fn java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    /// JVM heap limit, passed as `-Xmx<memory>` (e.g. `"3g"`).
    pub fn memory(mut self, memory: impl Into<String>) -> Self {
        self.memory = Some(memory.into());
        self
    }

    /// Jar archives to put on the classpath.
    pub fn classpath(mut self, jars: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.classpath.extend(jars.into_iter().map(Into::into));
        self
    }

    /// Override the pipeline main class.
    pub fn main_class(mut self, class: impl Into<String>) -> Self {
        self.main_class = class.into();
        self
    }

    /// Build the command.
    ///
    /// Fails with [`Error::ConfigNotFound`] if the properties file does not
    /// exist, before anything is spawned.
    pub fn build(self) -> Result<LaunchCommand> {
        if !self.properties.exists() {
            return Err(Error::ConfigNotFound {
                path: self.properties.display().to_string(),
            });
        }
        if self.classpath.is_empty() {
            return Err(Error::InvalidConfig("classpath is empty".into()));
        }
        let classpath = std::env::join_paths(&self.classpath)
            .map_err(|e| Error::InvalidConfig(format!("invalid classpath entry: {}", e)))?;

        let mut cmd = LaunchCommand::new(self.java.to_string_lossy());
        if let Some(memory) = self.memory.filter(|m| !m.is_empty()) {
            cmd = cmd.arg(format!("-Xmx{}", memory));
        }
        Ok(cmd
            .arg("-cp")
            .arg(classpath.to_string_lossy())
            .arg(self.main_class)
            .arg("-props")
            .arg(self.properties.to_string_lossy()))
    }
}
