//! What the attached terminal can do
//!
//! Detection reads the environment once at startup; `NO_COLOR`, `TERM=dumb`
//! and CI markers all downgrade the output.

use is_terminal::IsTerminal;

const CI_MARKERS: &[&str] = &["CI", "GITHUB_ACTIONS", "GITLAB_CI", "JENKINS_HOME", "TF_BUILD"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub stdout_tty: bool,
    pub stdin_tty: bool,
    pub supports_color: bool,
    pub supports_unicode: bool,
    pub is_ci: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        Self::from_env(
            |key| std::env::var(key).ok(),
            std::io::stdout().is_terminal(),
            std::io::stdin().is_terminal(),
        )
    }

    fn from_env(lookup: impl Fn(&str) -> Option<String>, stdout_tty: bool, stdin_tty: bool) -> Self {
        let dumb = lookup("TERM").is_some_and(|term| term.eq_ignore_ascii_case("dumb"));
        let is_ci = CI_MARKERS.iter().any(|key| lookup(key).is_some());

        Self {
            stdout_tty,
            stdin_tty,
            supports_color: stdout_tty && !dumb && lookup("NO_COLOR").is_none(),
            supports_unicode: !dumb && !is_ci,
            is_ci,
        }
    }

    /// Confirmation prompts need an operator on both ends
    pub fn can_prompt(&self) -> bool {
        self.stdout_tty && self.stdin_tty && !self.is_ci
    }
}
