//! Command implementations that work below the `App` layer.

pub mod init;
