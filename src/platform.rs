//! # Platform-specific utilities
//!
//! Questo modulo centralizza tutta la logica per la gestione cross-platform
//! dei tool encoder esterni. Supporta tool di sistema nel PATH e una
//! directory di override via variabile d'ambiente.

use crate::encoder::Encoder;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Directory holding encoder binaries, checked before the system PATH.
pub const TOOLS_DIR_ENV: &str = "IMAGE_OPTIMIZER_TOOLS";

/// Platform-specific command manager for the encoder tools
pub struct PlatformCommands {
    commands: HashMap<Encoder, &'static str>,
    which_command: &'static str,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    /// Initialize platform-specific commands
    fn new() -> Self {
        let (commands, which_command) = if cfg!(windows) {
            // Windows commands
            let mut commands = HashMap::new();
            commands.insert(Encoder::Mozjpeg, "cjpeg.exe");
            commands.insert(Encoder::Libwebp, "cwebp.exe");
            commands.insert(Encoder::Pngquant, "pngquant.exe");
            commands.insert(Encoder::Optipng, "optipng.exe");
            commands.insert(Encoder::Gifsicle, "gifsicle.exe");
            commands.insert(Encoder::Gif2webp, "gif2webp.exe");
            commands.insert(Encoder::Svgo, "svgo.cmd");
            (commands, "where")
        } else {
            // Unix-like systems (Linux, macOS)
            let mut commands = HashMap::new();
            commands.insert(Encoder::Mozjpeg, "cjpeg");
            commands.insert(Encoder::Libwebp, "cwebp");
            commands.insert(Encoder::Pngquant, "pngquant");
            commands.insert(Encoder::Optipng, "optipng");
            commands.insert(Encoder::Gifsicle, "gifsicle");
            commands.insert(Encoder::Gif2webp, "gif2webp");
            commands.insert(Encoder::Svgo, "svgo");
            (commands, "which")
        };

        Self {
            commands,
            which_command,
        }
    }

    /// Get the platform-specific tool name for an encoder
    pub fn tool_name(&self, encoder: Encoder) -> &'static str {
        self.commands[&encoder]
    }

    /// Get the command used to check if a program exists
    pub fn which_command(&self) -> &str {
        self.which_command
    }

    /// Resolve the invocable path for an encoder tool: the override
    /// directory when it holds the binary, the bare name otherwise.
    pub fn resolve_tool(&self, encoder: Encoder) -> PathBuf {
        self.override_tool(encoder)
            .unwrap_or_else(|| PathBuf::from(self.tool_name(encoder)))
    }

    fn override_tool(&self, encoder: Encoder) -> Option<PathBuf> {
        let dir = std::env::var(TOOLS_DIR_ENV).ok()?;
        let candidate = PathBuf::from(dir).join(self.tool_name(encoder));
        candidate.exists().then_some(candidate)
    }

    /// Check if an encoder tool is available (override dir or system PATH)
    pub async fn is_tool_available(&self, encoder: Encoder) -> bool {
        if self.override_tool(encoder).is_some() {
            return true;
        }

        let result = tokio::process::Command::new(self.which_command)
            .arg(self.tool_name(encoder))
            .output()
            .await;

        match result {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
}
