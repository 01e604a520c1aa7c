//! Deploy Use Case Tests

use super::*;
use crate::application::testing::{bundle_file, Harness};
use crate::domain::entities::{ComponentBody, ComponentSelection, DeployStatus};
use crate::domain::ports::{DeployOutcome, ToolError};
use crate::domain::services::compute_pending;
use crate::domain::value_objects::ComponentKind;
use crate::error::{ErrorCategory, ReleaseError};
use serde_json::json;

fn harness() -> Harness {
    let h = Harness::new();
    h.toolchain.add_component(
        ComponentKind::FlexCard,
        "CaseView",
        ComponentBody::new(json!({
            "Name": "CaseView",
            "PropertySetConfig": {
                "dataSource": {"type": "IntegrationProcedures", "value": {"ipMethod": "GetCaseDetails"}}
            }
        })),
    );
    h.toolchain.add_component(
        ComponentKind::IntegrationProcedure,
        "GetCaseDetails",
        ComponentBody::new(json!({"Name": "GetCaseDetails"}))
            .with_step("FetchCase", json!({"propertySetConfig": {"bundle": "DRGetCase"}})),
    );
    h.toolchain.add_component(
        ComponentKind::DataRaptor,
        "DRGetCase",
        ComponentBody::new(json!({"Name": "DRGetCase"})),
    );
    h
}

fn full_selection() -> ComponentSelection {
    ComponentSelection::new()
        .with(ComponentKind::FlexCard, "CaseView")
        .with(ComponentKind::IntegrationProcedure, "GetCaseDetails")
        .with(ComponentKind::DataRaptor, "DRGetCase")
}

fn options(selection: ComponentSelection) -> DeployOptions {
    DeployOptions::new("dev", "main", selection, "jdoe").with_target("uat")
}

#[test]
fn missing_dependency_aborts_before_any_write() {
    let h = harness();
    let selection = ComponentSelection::new().with(ComponentKind::FlexCard, "CaseView");

    let err = DeployUseCase::new(&h.context)
        .execute(&options(selection))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::ValidationFailure);
    let ReleaseError::MissingDependencies(report) = err else {
        panic!("expected missing dependencies");
    };
    assert_eq!(
        serde_json::to_value(&report.missing).unwrap(),
        json!({"IntegrationProcedure": {"CaseView": ["GetCaseDetails"]}})
    );
    assert!(h.context.ledger().list_releases("dev", None).unwrap().is_empty());
    assert!(h.context.component_store().load("dev").unwrap().is_empty());
    assert!(h.toolchain.deployed().is_empty());
    assert!(h.remote.tags().is_empty());
}

#[test]
fn allow_missing_deploys_anyway_and_reports() {
    let h = harness();
    let selection = ComponentSelection::new().with(ComponentKind::FlexCard, "CaseView");

    let result = DeployUseCase::new(&h.context)
        .execute(&options(selection).with_allow_missing(true))
        .unwrap();

    assert!(result.published);
    assert!(result.dependencies.has_missing());
}

#[test]
fn successful_release_is_recorded_published_and_tagged() {
    let h = harness();

    let result = DeployUseCase::new(&h.context)
        .execute(&options(full_selection()).with_name("Case management"))
        .unwrap();

    let id = result.release.release_id.to_string();
    assert!(result.published);
    assert!(result.all_succeeded());
    assert_eq!(result.recorded.created, 3);
    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(result.outcomes[0].status, DeployStatus::Success);
    assert_eq!(result.release.release_name.as_deref(), Some("Case management"));

    assert_eq!(h.remote.tags(), vec![id.clone()]);
    assert_eq!(h.remote.tag_target(&id), result.release_commit);
    assert_eq!(h.remote.commit_messages("main"), vec![format!("Release {id}")]);
    let files = h.remote.branch_files("main");
    assert!(files.contains_key(&format!("releases/{id}.json")));
    assert!(files.contains_key(&format!(
        "vlocity/{}",
        bundle_file(&ComponentKind::FlexCard, "CaseView")
    )));

    let stored = h.context.ledger().get_release("dev", &result.release.release_id).unwrap();
    assert_eq!(stored, result.release);
    assert_eq!(h.toolchain.authenticated(), vec!["dev".to_string(), "uat".to_string()]);
}

#[test]
fn deployed_components_leave_the_pending_view() {
    let h = harness();
    DeployUseCase::new(&h.context)
        .execute(&options(full_selection()))
        .unwrap();

    let index = h.context.component_store().load("dev").unwrap();
    let latest = h.context.ledger().latest_release("dev").unwrap();

    assert!(compute_pending(&index, latest.as_ref()).is_empty());
}

#[test]
fn authentication_failure_writes_nothing() {
    let h = harness();
    h.toolchain.reject_auth("uat");

    let err = DeployUseCase::new(&h.context)
        .execute(&options(full_selection()))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::AuthFailure);
    assert_eq!(h.toolchain.export_calls(), 0);
    assert!(h.context.ledger().list_releases("dev", None).unwrap().is_empty());
    assert!(h.remote.head("main").is_none());
}

#[test]
fn export_failure_writes_nothing() {
    let h = harness();
    h.toolchain.fail_export("Error: session expired");

    let err = DeployUseCase::new(&h.context)
        .execute(&options(full_selection()))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::ExternalToolFailure);
    assert!(h.context.ledger().list_releases("dev", None).unwrap().is_empty());
    assert!(h.context.component_store().load("dev").unwrap().is_empty());
}

#[test]
fn tool_error_is_logged_and_release_stays_unpublished() {
    let h = harness();
    h.toolchain.set_deploy_result(
        "uat",
        Err(ToolError::Timeout {
            tool: "vlocity packDeploy".to_string(),
            after_secs: 600,
        }),
    );

    let result = DeployUseCase::new(&h.context)
        .execute(&options(full_selection()))
        .unwrap();

    assert!(!result.published);
    assert!(result.release_commit.is_none());
    assert_eq!(result.outcomes[0].status, DeployStatus::Error);
    assert!(result.outcomes[0].details.contains("timed out"));
    let stored = h.context.ledger().get_release("dev", &result.release.release_id).unwrap();
    assert_eq!(stored.deployment_log, result.outcomes);
    assert!(h.remote.tags().is_empty());
    assert!(h.remote.head("main").is_none());
}

#[test]
fn one_failing_target_blocks_publication() {
    let h = harness();
    h.toolchain
        .set_deploy_result("sit", Ok(DeployOutcome::failure("Error: FIELD_INTEGRITY_EXCEPTION")));

    let result = DeployUseCase::new(&h.context)
        .execute(&options(full_selection()).with_target("sit"))
        .unwrap();

    let statuses: Vec<DeployStatus> = result.outcomes.iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec![DeployStatus::Success, DeployStatus::Error]);
    assert!(!result.published);
}

#[test]
fn warnings_still_publish() {
    let h = harness();
    h.toolchain.set_deploy_result(
        "uat",
        Ok(DeployOutcome {
            succeeded: true,
            warnings: vec!["CaseView: field label truncated".to_string()],
            raw_log: String::new(),
        }),
    );

    let result = DeployUseCase::new(&h.context)
        .execute(&options(full_selection()))
        .unwrap();

    assert_eq!(result.outcomes[0].status, DeployStatus::Warning);
    assert_eq!(result.outcomes[0].details, "CaseView: field label truncated");
    assert!(result.published);
}

#[test]
fn each_release_gets_its_own_tag() {
    let h = harness();
    let use_case = DeployUseCase::new(&h.context);

    let first = use_case.execute(&options(full_selection())).unwrap();
    let second = use_case.execute(&options(full_selection())).unwrap();

    assert_ne!(first.release.release_id, second.release.release_id);
    assert_eq!(h.remote.tags().len(), 2);
}

#[test]
fn empty_selection_is_rejected() {
    let h = harness();
    let err = DeployUseCase::new(&h.context)
        .execute(&options(ComponentSelection::new()))
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ValidationFailure);
    assert!(h.toolchain.authenticated().is_empty());
}

#[test]
fn unexported_selection_entry_is_skipped_and_reported() {
    let h = harness();
    let selection = full_selection().with(ComponentKind::FlexCard, "Ghost");

    let result = DeployUseCase::new(&h.context)
        .execute(&options(selection))
        .unwrap();

    assert_eq!(result.skipped, vec!["FlexCard/Ghost".to_string()]);
    assert_eq!(result.recorded.created, 3);
    assert!(!result.dependencies.has_missing());
    assert!(result.published);
}

#[test]
fn redeploy_keeps_identity_and_merges_selection() {
    let h = harness();
    h.toolchain.add_component(
        ComponentKind::metadata("ApexClass"),
        "CaseService",
        ComponentBody::new(json!("public class CaseService {}")),
    );
    let use_case = DeployUseCase::new(&h.context);
    let first = use_case.execute(&options(full_selection())).unwrap();
    let id = first.release.release_id.clone();

    let result = use_case
        .redeploy_release(&RedeployOptions {
            source_alias: "dev".to_string(),
            release_id: id.clone(),
            additional: ComponentSelection::new()
                .with(ComponentKind::metadata("ApexClass"), "CaseService"),
            actor: "asmith".to_string(),
            allow_missing: false,
        })
        .unwrap();

    assert_eq!(result.release.release_id, id);
    assert_eq!(result.release.component_selection.len(), 4);
    assert_eq!(result.release.deployment_log.len(), 2);
    assert_eq!(result.release.deployed_by, "asmith");
    assert!(result.published);
    assert_eq!(h.remote.tags(), vec![id.to_string()]);
    assert_eq!(h.remote.tag_target(id.as_str()), result.release_commit);
    assert_ne!(first.release_commit, result.release_commit);

    let releases = h.context.ledger().list_releases("dev", None).unwrap();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].component_selection.len(), 4);

    let deployed = h.toolchain.deployed();
    assert_eq!(deployed.len(), 2);
    assert_eq!(deployed[1].0, "uat");
    assert!(deployed[1]
        .1
        .contains(&ComponentKind::metadata("ApexClass"), "CaseService"));
}

#[test]
fn redeploy_of_unknown_release_is_not_found() {
    let h = harness();
    let err = DeployUseCase::new(&h.context)
        .redeploy_release(&RedeployOptions {
            source_alias: "dev".to_string(),
            release_id: "release-2020-01-01T00-00-00Z".parse().unwrap(),
            additional: ComponentSelection::new(),
            actor: "jdoe".to_string(),
            allow_missing: false,
        })
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn promote_deploys_tagged_content_without_new_identity() {
    let h = harness();
    let use_case = DeployUseCase::new(&h.context);
    let release = use_case.execute(&options(full_selection())).unwrap();
    let commits_before = h.remote.commit_messages("main");

    let result = use_case
        .promote_release(&PromoteOptions {
            source_alias: "dev".to_string(),
            release_id: release.release.release_id.clone(),
            target: "prod".to_string(),
            actor: "jdoe".to_string(),
        })
        .unwrap();

    assert_eq!(result.outcome.target_alias, "prod");
    assert_eq!(result.release.deployment_log.len(), 2);
    assert_eq!(h.remote.commit_messages("main"), commits_before);
    assert_eq!(h.remote.tags().len(), 1);

    let deployed = h.toolchain.deployed();
    let (target, _, files) = &deployed[1];
    assert_eq!(target, "prod");
    assert!(files.contains_key(&bundle_file(&ComponentKind::DataRaptor, "DRGetCase")));

    let stored = h
        .context
        .ledger()
        .release_history("dev", &release.release.release_id)
        .unwrap();
    assert_eq!(stored.len(), 2);
}

#[test]
fn promote_without_tag_is_not_found() {
    let h = harness();
    h.toolchain.set_deploy_result("uat", Ok(DeployOutcome::failure("boom")));
    let use_case = DeployUseCase::new(&h.context);
    let release = use_case.execute(&options(full_selection())).unwrap();
    assert!(!release.published);

    let err = use_case
        .promote_release(&PromoteOptions {
            source_alias: "dev".to_string(),
            release_id: release.release.release_id,
            target: "prod".to_string(),
            actor: "jdoe".to_string(),
        })
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::NotFound);
}
