// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::strategies::arb_template;
use proptest::prelude::*;
use std::sync::Arc;

fn parent() -> Template {
    Template::new("parent", "parent")
        .label("linux")
        .idle_minutes(10u32)
        .containers(vec![ContainerSpec {
            working_dir: "/home/agent".into(),
            env: [("JAVA_OPTS".to_string(), "-Xmx1g".to_string())].into(),
            ..ContainerSpec::new("jnlp", "agent:4")
        }])
        .volumes(vec![VolumeSpec::empty_dir("/cache")])
}

fn child() -> Template {
    Template::new("child", "")
        .inherit_from(vec![TemplateId::from("parent")])
        .containers(vec![
            ContainerSpec {
                env: [("GRADLE_OPTS".to_string(), "-q".to_string())].into(),
                ..ContainerSpec::new("jnlp", "")
            },
            ContainerSpec::new("build", "maven:3"),
        ])
        .volumes(vec![VolumeSpec {
            mount_path: "/cache".into(),
            source: VolumeSource::HostPath { host_path: "/var/cache".into() },
        }])
        .retention(RetentionPolicy::NeverDelete)
}

#[test]
fn child_unset_fields_are_inherited() {
    let merged = combine(&parent(), &child());
    assert_eq!(merged.name, "parent");
    assert_eq!(merged.label, "linux");
    assert_eq!(merged.idle_minutes, Some(10));
    assert_eq!(merged.retention, Some(RetentionPolicy::NeverDelete));
}

#[test]
fn containers_merge_by_name_in_parent_order() {
    let merged = combine(&parent(), &child());
    let names: Vec<_> = merged.containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["jnlp", "build"]);

    let jnlp = merged.container("jnlp").unwrap();
    assert_eq!(jnlp.image, "agent:4");
    assert_eq!(jnlp.working_dir, "/home/agent");
    assert_eq!(jnlp.env.len(), 2);
    assert_eq!(merged.container("build").unwrap().image, "maven:3");
}

#[test]
fn child_set_fields_win() {
    let child = child().label("arm64").idle_minutes(0u32);
    let merged = combine(&parent(), &child);
    assert_eq!(merged.label, "arm64");
    assert_eq!(merged.idle_minutes, Some(0));
}

#[test]
fn volume_redefined_by_child_replaces_source() {
    let merged = combine(&parent(), &child());
    assert_eq!(merged.volumes.len(), 1);
    assert_eq!(merged.volumes[0].source, VolumeSource::HostPath { host_path: "/var/cache".into() });
}

#[test]
fn env_child_wins_on_collision() {
    let mut child = child();
    child.containers[0].env.insert("JAVA_OPTS".into(), "-Xmx4g".into());
    let merged = combine(&parent(), &child);
    assert_eq!(merged.container("jnlp").unwrap().env["JAVA_OPTS"], "-Xmx4g");
}

#[test]
fn result_is_effective_and_inputs_untouched() {
    let (p, c) = (parent(), child());
    let merged = combine(&p, &c);
    assert_eq!(merged.id, c.id);
    assert!(merged.inherit_from.is_empty());
    assert_eq!(p, parent());
    assert_eq!(c, child());
}

#[test]
fn empty_chain_resolves_to_nothing() {
    assert!(resolve_chain(&[]).is_none());
}

#[test]
fn single_template_chain_drops_inherit_from() {
    let resolved = resolve_chain(&[Arc::new(child())]).unwrap();
    assert!(resolved.inherit_from.is_empty());
    assert_eq!(resolved.containers, child().containers);
}

proptest! {
    #[test]
    fn combine_is_associative(a in arb_template(), b in arb_template(), c in arb_template()) {
        prop_assert_eq!(combine(&combine(&a, &b), &c), combine(&a, &combine(&b, &c)));
    }

    #[test]
    fn chain_resolution_is_sequential_combine(a in arb_template(), b in arb_template(), c in arb_template()) {
        let chain = [Arc::new(a.clone()), Arc::new(b.clone()), Arc::new(c.clone())];
        prop_assert_eq!(resolve_chain(&chain).unwrap(), combine(&combine(&a, &b), &c));
    }

    #[test]
    fn resolving_twice_is_equal(a in arb_template(), b in arb_template()) {
        let chain = [Arc::new(a), Arc::new(b)];
        prop_assert_eq!(resolve_chain(&chain), resolve_chain(&chain));
    }

    #[test]
    fn set_child_scalars_override(a in arb_template(), b in arb_template()) {
        let merged = combine(&a, &b);
        if !b.name.is_empty() {
            prop_assert_eq!(&merged.name, &b.name);
        } else {
            prop_assert_eq!(&merged.name, &a.name);
        }
        prop_assert_eq!(merged.idle_minutes, b.idle_minutes.or(a.idle_minutes));
        prop_assert_eq!(merged.retention, b.retention.clone().or(a.retention.clone()));
    }

    #[test]
    fn every_container_key_survives(a in arb_template(), b in arb_template()) {
        let merged = combine(&a, &b);
        for c in a.containers.iter().chain(&b.containers) {
            prop_assert!(merged.container(&c.name).is_some());
        }
    }
}
