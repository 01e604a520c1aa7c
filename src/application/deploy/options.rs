//! Deploy options

use crate::domain::entities::ComponentSelection;
use crate::domain::value_objects::ReleaseId;
use crate::error::{ReleaseError, ReleaseResult};

/// Options for a new release
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Environment the components are exported from
    pub source_alias: String,
    /// Environments the bundle is deployed to, in order
    pub targets: Vec<String>,
    /// Release branch of the versioned store
    pub branch: String,
    pub selection: ComponentSelection,
    pub release_name: Option<String>,
    pub actor: String,
    /// Deploy even when the selection leaves out dependencies
    pub allow_missing: bool,
}

impl DeployOptions {
    pub fn new(
        source_alias: impl Into<String>,
        branch: impl Into<String>,
        selection: ComponentSelection,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            source_alias: source_alias.into(),
            targets: Vec::new(),
            branch: branch.into(),
            selection,
            release_name: None,
            actor: actor.into(),
            allow_missing: false,
        }
    }

    pub fn with_target(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !self.targets.contains(&alias) {
            self.targets.push(alias);
        }
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.release_name = Some(name.into());
        self
    }

    pub fn with_allow_missing(mut self, allow: bool) -> Self {
        self.allow_missing = allow;
        self
    }

    pub(super) fn validate(&self) -> ReleaseResult<()> {
        if self.selection.is_empty() {
            return Err(ReleaseError::Validation(
                "component selection is empty".to_string(),
            ));
        }
        self.selection.validate().map_err(ReleaseError::Validation)?;
        if self.targets.is_empty() {
            return Err(ReleaseError::Validation(
                "at least one target environment is required".to_string(),
            ));
        }
        require_name("source environment", &self.source_alias)?;
        require_name("branch", &self.branch)?;
        for target in &self.targets {
            require_name("target environment", target)?;
        }
        Ok(())
    }
}

/// Options for re-running a recorded release
#[derive(Debug, Clone)]
pub struct RedeployOptions {
    pub source_alias: String,
    pub release_id: ReleaseId,
    /// Components merged into the release selection
    pub additional: ComponentSelection,
    pub actor: String,
    pub allow_missing: bool,
}

/// Options for deploying a recorded release to one more environment
#[derive(Debug, Clone)]
pub struct PromoteOptions {
    pub source_alias: String,
    pub release_id: ReleaseId,
    pub target: String,
    pub actor: String,
}

pub(super) fn require_name(what: &str, value: &str) -> ReleaseResult<()> {
    if value.trim().is_empty() {
        return Err(ReleaseError::Validation(format!("{what} must not be empty")));
    }
    if value.starts_with('-') {
        return Err(ReleaseError::Validation(format!(
            "{what} '{value}' must not start with '-'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ComponentKind;

    fn selection() -> ComponentSelection {
        ComponentSelection::new().with(ComponentKind::FlexCard, "CaseView")
    }

    #[test]
    fn targets_are_deduplicated() {
        let options = DeployOptions::new("dev", "main", selection(), "jdoe")
            .with_target("uat")
            .with_target("uat")
            .with_target("sit");
        assert_eq!(options.targets, vec!["uat".to_string(), "sit".to_string()]);
    }

    #[test]
    fn empty_selection_is_invalid() {
        let options = DeployOptions::new("dev", "main", ComponentSelection::new(), "jdoe")
            .with_target("uat");
        assert!(options.validate().is_err());
    }

    #[test]
    fn flag_like_branch_is_invalid() {
        let options = DeployOptions::new("dev", "--upload-pack=x", selection(), "jdoe")
            .with_target("uat");
        assert!(options.validate().is_err());
    }

    #[test]
    fn missing_targets_are_invalid() {
        let options = DeployOptions::new("dev", "main", selection(), "jdoe");
        assert!(options.validate().is_err());
    }
}
