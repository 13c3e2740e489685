//! The textual command front-end.
//!
//! Each input line is tokenized on single spaces and validated before
//! anything touches the mounted image: argument count, name and path
//! lengths, and numeric ranges. A line that fails validation is reported
//! with the input file name and line number and then forgotten; a valid
//! line dispatches to one [`Session`] operation, and a successful
//! mutation is persisted back to the disk file immediately.

use crate::error_fs::FsError;
use crate::ops::{IoBuffer, Session};
use std::io::Write;

/// A syntactically valid command, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `M <disk>`: mount a disk image.
    Mount(String),
    /// `C <name> <size>`: create a file, or a directory when size is 0.
    Create {
        /// Name of the new file or directory.
        name: String,
        /// Size in blocks, 0 for a directory.
        size: u8,
    },
    /// `D <name>`: delete a file or directory tree.
    Delete(String),
    /// `R <name> <block>`: read one file block into the buffer.
    Read {
        /// The file to read from.
        name: String,
        /// Block number within the file.
        block: u8,
    },
    /// `W <name> <block>`: write the buffer into one file block.
    Write {
        /// The file to write to.
        name: String,
        /// Block number within the file.
        block: u8,
    },
    /// `B <bytes...>`: load the transfer buffer.
    Buffer(Vec<u8>),
    /// `L`: list the current directory.
    List,
    /// `E <name> <size>`: resize a file.
    Resize {
        /// The file to resize.
        name: String,
        /// The new size in blocks.
        size: u8,
    },
    /// `O`: defragment the disk.
    Defrag,
    /// `Y <name>`: change the working directory.
    ChangeDir(String),
}

// Names and disk paths must be nonempty and bounded.
fn arg_ok(token: &str, max_len: usize) -> bool {
    !token.is_empty() && token.len() <= max_len
}

// Numeric arguments are decimals in 0..=127.
fn parse_num(token: &str) -> Option<u8> {
    token.parse::<u8>().ok().filter(|&v| v < 128)
}

/// Tokenize and validate one line. The command is the first character of
/// the first token; `None` means the line is malformed and must be
/// reported as a command error.
pub fn parse(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split(' ').collect();
    let cmd = tokens.first()?.chars().next()?;
    match cmd {
        'M' if tokens.len() == 2 && arg_ok(tokens[1], 20) => {
            Some(Command::Mount(tokens[1].to_string()))
        }
        'C' if tokens.len() == 3 && arg_ok(tokens[1], 5) => {
            parse_num(tokens[2]).map(|size| Command::Create {
                name: tokens[1].to_string(),
                size,
            })
        }
        'D' if tokens.len() == 2 && arg_ok(tokens[1], 5) => {
            Some(Command::Delete(tokens[1].to_string()))
        }
        'R' if tokens.len() == 3 && arg_ok(tokens[1], 5) => {
            parse_num(tokens[2]).map(|block| Command::Read {
                name: tokens[1].to_string(),
                block,
            })
        }
        'W' if tokens.len() == 3 && arg_ok(tokens[1], 5) => {
            parse_num(tokens[2]).map(|block| Command::Write {
                name: tokens[1].to_string(),
                block,
            })
        }
        'B' if tokens.len() >= 2 => Some(Command::Buffer(tokens[1..].join(" ").into_bytes())),
        'L' if tokens.len() == 1 => Some(Command::List),
        'E' if tokens.len() == 3 && arg_ok(tokens[1], 5) => {
            parse_num(tokens[2]).map(|size| Command::Resize {
                name: tokens[1].to_string(),
                size,
            })
        }
        'O' if tokens.len() == 1 => Some(Command::Defrag),
        'Y' if tokens.len() == 2 && arg_ok(tokens[1], 5) => {
            Some(Command::ChangeDir(tokens[1].to_string()))
        }
        _ => None,
    }
}

/// The command loop's state: at most one mounted session, the transfer
/// buffer that outlives remounts, and the input file name used in
/// command-error diagnostics.
pub struct Shell {
    input_name: String,
    session: Option<Session>,
    buffer: IoBuffer,
}

impl Shell {
    /// A fresh, unmounted shell. `input_name` is echoed in command-error
    /// diagnostics exactly as given.
    pub fn new(input_name: String) -> Shell {
        Shell {
            input_name,
            session: None,
            buffer: IoBuffer::default(),
        }
    }

    /// Is a disk currently mounted?
    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The transfer buffer.
    pub fn buffer(&self) -> &IoBuffer {
        &self.buffer
    }

    /// Execute one input line. Listing output goes to `out`; every
    /// diagnostic goes to stderr. Errors never escape a line: the caller
    /// just feeds the next one.
    pub fn execute_line(&mut self, line: &str, line_no: usize, out: &mut dyn Write) {
        if line.is_empty() {
            return;
        }
        let cmd = match parse(line) {
            Some(cmd) => cmd,
            None => {
                eprintln!("Command Error: {}, {}", self.input_name, line_no);
                return;
            }
        };
        if let Command::Mount(path) = &cmd {
            self.mount(path);
            return;
        }
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => {
                eprintln!("{}", FsError::NotMounted);
                return;
            }
        };
        // Each arm reports whether the image changed and must be written
        // back to its disk file.
        let result = match cmd {
            Command::Create { name, size } => session.create(&name, size).map(|()| true),
            Command::Delete(name) => session.delete(&name).map(|()| true),
            Command::Read { name, block } => {
                session.read(&name, block, &mut self.buffer).map(|()| false)
            }
            Command::Write { name, block } => {
                session.write(&name, block, &self.buffer).map(|()| true)
            }
            Command::Buffer(bytes) => {
                self.buffer.fill(&bytes);
                Ok(false)
            }
            Command::List => {
                session.list(out).ok();
                Ok(false)
            }
            Command::Resize { name, size } => session.resize(&name, size).map(|()| true),
            Command::Defrag => {
                session.defragment();
                Ok(true)
            }
            Command::ChangeDir(name) => session.change_dir(&name).map(|()| false),
            Command::Mount(_) => unreachable!("mount is handled above"),
        };
        match result {
            Ok(true) => {
                if let Err(err) = session.persist() {
                    eprintln!("{}", err);
                }
            }
            Ok(false) => {}
            Err(err) => eprintln!("{}", err),
        }
    }

    // Mount flow: flush the current disk first, then try to adopt the new
    // one. A mount that fails to open or verify leaves the current
    // session in place.
    fn mount(&mut self, path: &str) {
        if let Some(old) = &self.session {
            if let Err(err) = old.persist() {
                eprintln!("{}", err);
            }
        }
        match Session::mount(path) {
            Ok(session) => {
                if let Err(err) = session.persist() {
                    eprintln!("{}", err);
                }
                self.session = Some(session);
            }
            Err(err) => eprintln!("{}", err),
        }
    }
}
