//! Command type for building executable commands

use async_process::Command as AsyncCommand;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// A command to be executed
///
/// This is a builder for creating commands that can be converted to
/// `async_process::Command` when needed. Unlike `AsyncCommand`, this type is
/// `Clone` and can be prepared once per retry attempt.
#[derive(Debug, Clone)]
pub struct Command {
    /// The program to execute
    program: OsString,
    /// The arguments to pass to the program
    args: Vec<OsString>,
    /// Environment variables to set
    env: HashMap<OsString, OsString>,
    /// Working directory for the command
    current_dir: Option<PathBuf>,
}

impl Command {
    /// Create a new command for the given program
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            env: HashMap::new(),
            current_dir: None,
        }
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// Set an environment variable
    pub fn env<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.env
            .insert(key.as_ref().to_owned(), val.as_ref().to_owned());
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: AsRef<std::path::Path>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.as_ref().to_owned());
        self
    }

    /// Get the program name
    pub fn get_program(&self) -> &OsStr {
        &self.program
    }

    /// Get the arguments
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Get the current directory
    pub fn get_current_dir(&self) -> Option<&std::path::Path> {
        self.current_dir.as_deref()
    }

    /// Prepare this command for execution by converting to an `async_process::Command`
    pub fn prepare(&self) -> AsyncCommand {
        let mut cmd = AsyncCommand::new(&self.program);
        cmd.args(&self.args);
        for (key, val) in &self.env {
            cmd.env(key, val);
        }
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_creation() {
        let cmd = Command::new("echo");
        assert_eq!(cmd.get_program(), "echo");
        assert_eq!(cmd.get_args().len(), 0);
    }

    #[test]
    fn test_command_with_args() {
        let mut cmd = Command::new("docker");
        cmd.arg("ps").arg("--filter").arg("name=web");

        assert_eq!(cmd.get_args().len(), 3);
        assert_eq!(cmd.get_args()[0], "ps");
        assert_eq!(cmd.get_args()[2], "name=web");
    }

    #[test]
    fn test_command_clone_is_independent() {
        let mut cmd1 = Command::new("ls");
        cmd1.arg("-l");
        let mut cmd2 = cmd1.clone();
        cmd2.arg("/tmp");

        assert_eq!(cmd1.get_args().len(), 1);
        assert_eq!(cmd2.get_args().len(), 2);
    }

    #[test]
    fn test_command_prepare() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello").current_dir("/tmp");

        // The fact that conversion succeeds without panicking is the test;
        // AsyncCommand internals are not inspectable.
        let _async_cmd = cmd.prepare();
    }
}
