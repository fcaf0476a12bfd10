//! Integration tests for the public synthesis and display-name helpers.

use cloudscope_core::{ApiResource, ProviderKind, display_name, synthesize};

#[test]
fn test_display_name_examples() {
    assert_eq!(display_name("compute.googleapis.com", ".googleapis.com"), "Compute");
    assert_eq!(display_name("bigquery.googleapis.com", ".googleapis.com"), "Bigquery");
}

#[test]
fn test_synthesis_stable_across_calls() {
    let ids = ["compute.googleapis.com", "storage.googleapis.com", "ec2.amazonaws.com"];
    for id in ids {
        assert_eq!(synthesize(id), synthesize(id), "Series changed for {id}");
    }
}

#[test]
fn test_breakdown_always_sums_to_100() {
    for id in ["", "a", "compute.googleapis.com", "ünïcødé"] {
        let status = synthesize(id).status;
        assert_eq!(status.successful_tenths + status.error_tenths, 1000);
    }
}

#[test]
fn test_resource_display_name_matches_helper() {
    let api = ApiResource::from_canonical(ProviderKind::Gcp, "pubsub.googleapis.com");
    assert_eq!(api.display_name, display_name(&api.canonical_id, ".googleapis.com"));
}
