//! Shell detection and the per-shell completion hook.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Shells the PTY driver knows how to instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellType {
    Zsh,
    Bash,
    Sh,
}

impl ShellType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Zsh => "zsh",
            Self::Bash => "bash",
            Self::Sh => "sh",
        }
    }

    /// Whether the shell runs a hook before every prompt.
    ///
    /// Shells without one get the completion marker appended to each
    /// command line instead.
    pub fn has_prompt_hook(self) -> bool {
        matches!(self, Self::Zsh | Self::Bash)
    }

    /// Arguments used when the config does not provide any.
    ///
    /// Startup files are skipped so prompts and line editors cannot inject
    /// output between commands.
    pub fn default_args(self) -> Vec<String> {
        let args: &[&str] = match self {
            Self::Bash => &["--noprofile", "--norc", "--noediting", "-i"],
            Self::Zsh => &["-f", "-i"],
            Self::Sh => &["-i"],
        };
        args.iter().map(|a| (*a).to_string()).collect()
    }

    /// Shell snippet that prints the completion marker for `nonce`.
    ///
    /// Saves `$?` first, turns tty echo off so the next command line is not
    /// echoed, then prints `\x1eSB<nonce>;<status>;<pwd>\x1e`.
    pub fn marker_command(self, nonce: &str) -> String {
        format!(
            "__sb_rc=$?; stty -echo 2>/dev/null; printf '\\036SB%s;%s;%s\\036' '{nonce}' \"$__sb_rc\" \"$PWD\""
        )
    }

    /// Script written to the shell once at startup.
    ///
    /// Clears the prompts and installs the marker hook. For shells without
    /// a hook it prints the marker once, so startup can wait for it either
    /// way.
    pub fn setup_script(self, nonce: &str) -> String {
        let marker = self.marker_command(nonce);
        match self {
            Self::Bash => format!(
                " export PS1='' PS2='' HISTCONTROL=ignorespace; PROMPT_COMMAND='{}'\n",
                marker.replace('\'', "'\\''")
            ),
            Self::Zsh => format!(
                " unsetopt zle prompt_sp prompt_cr 2>/dev/null; setopt hist_ignore_space; \
                 PS1='' PS2='' RPROMPT='' PROMPT_EOL_MARK=''; precmd() {{ {marker}; }}\n"
            ),
            Self::Sh => format!(" PS1='' PS2=''; {marker}\n"),
        }
    }

    /// The bytes sent to run `command` in this shell.
    ///
    /// The leading space keeps the line out of history. Echo is re-enabled
    /// for the command so interactive input shows up in the output.
    ///
    /// Without a prompt hook the command goes on its own lines inside a
    /// brace group and the marker follows the closing brace. A trailing
    /// `;` or `&`, or a `#` comment, then cannot reach the marker.
    /// Multi-line commands are grouped for hook shells too, so the hook
    /// fires once.
    pub fn command_line(self, command: &str, nonce: &str) -> String {
        if !self.has_prompt_hook() {
            return format!(
                " stty echo 2>/dev/null; {{\n{command}\n}}; {}\n",
                self.marker_command(nonce)
            );
        }
        if command.contains('\n') {
            format!(" stty echo 2>/dev/null; {{\n{command}\n}}\n")
        } else {
            format!(" stty echo 2>/dev/null; {command}\n")
        }
    }
}

/// Detect the shell type from a path such as `/bin/zsh` or `/usr/bin/dash`.
pub fn detect_shell_type(shell_path: &PathBuf) -> Option<ShellType> {
    let name = Path::new(shell_path).file_stem()?.to_str()?;
    match name {
        "zsh" => Some(ShellType::Zsh),
        "bash" => Some(ShellType::Bash),
        "sh" | "dash" | "ash" => Some(ShellType::Sh),
        _ => None,
    }
}

#[cfg(test)]
#[path = "shell_types.test.rs"]
mod tests;
