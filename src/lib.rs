//! Compiler and linker flags for building native code against the local Python interpreter.
//!
//! This crate backs the `pyflags-include` and `pyflags-ldflags` executables, which print
//! a single line of flags for a makefile or shell script to splice into a compiler or linker
//! invocation:
//!
//! ```text
//! $ pyflags-include
//! -I/usr/include/python3.11 -I/usr/include/python3.11
//! $ pyflags-ldflags
//! -L/usr/lib/python3.11/config-3.11-x86_64-linux-gnu -lpython3.11 -lm -lpthread -Xlinker -export-dynamic
//! ```
//!
//! The interpreter's configuration is captured once as a [`SysConfig`], either by running the
//! interpreter or by reading a snapshot file, and the flag lists are then computed from it.

pub mod cli;
mod errors;
mod flags;
mod interpreter;
mod sysconfig;

pub use errors::{Context, Error, ErrorKind, ErrorReport, Result};
pub use flags::{framework_link_args, include_flags, join_flags, ld_flags};
pub use interpreter::{find_interpreter, PYTHON_ENV};
pub use sysconfig::{ResolveOptions, SysConfig, CONFIG_FILE_ENV};
