//! Deterministic container names.
//!
//! The name doubles as the artifact directory name under the output root, so
//! the token order below must stay stable for results of earlier runs to
//! remain locatable:
//!
//! `[x-]<mode>-[plain-]<stem>` then, outside decomposition-only mode,
//! `-[s<level>]<algo>[-<mem>G][-u<n>][-o][-c][-g][-i]`, then
//! `[-<partition>][-ex<example>]`.

use crate::core::partition::UnitIndex;
use crate::core::run_config::RunConfig;

/// Container name for one unit of `config`.
pub fn container_name(config: &RunConfig, index: UnitIndex) -> String {
    let mut name = String::new();

    if config.devel {
        name.push_str("x-");
    }
    name.push_str(config.mode().as_str());
    name.push('-');
    if config.plain {
        name.push_str("plain-");
    }
    name.push_str(config.project_id.stem());

    if config.decomp_only {
        // Partitions of one run must not collide on the container name.
        if let Some(part) = index.partition {
            name.push_str(&format!("-{part}"));
        }
        return name;
    }

    name.push('-');
    if config.staged_active() {
        name.push_str(&format!("s{}", config.max_stmt_level));
    }
    name.push_str(config.algorithm.as_str());
    if !config.plain {
        name.push_str(&format!("-{}G", config.memory));
    }
    if config.shuffle_count > 0 {
        name.push_str(&format!("-u{}", config.shuffle_count));
    }
    if config.optout && !config.plain {
        name.push_str("-o");
    }
    if config.custom_split && !config.plain {
        name.push_str("-c");
    }
    if config.greedy {
        name.push_str("-g");
    }
    if config.ignore_test_msg {
        name.push_str("-i");
    }
    if let Some(part) = index.partition {
        name.push_str(&format!("-{part}"));
    }
    if let Some(example) = index.example {
        name.push_str(&format!("-ex{example}"));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Algorithm, MemoryGb};
    use crate::test_support::run_config;

    fn example(ex: u32) -> UnitIndex {
        UnitIndex {
            partition: None,
            example: Some(ex),
        }
    }

    #[test]
    fn default_example_run_name() {
        let cfg = run_config("foo_d4j");
        assert_eq!(container_name(&cfg, example(0)), "d4j-foo-ddmin-8G-c-ex0");
    }

    #[test]
    fn decomp_only_uses_mode_and_stem() {
        let mut cfg = run_config("foo_ddj");
        cfg.decomp_only = true;
        assert_eq!(container_name(&cfg, example(0)), "ddj-foo");
    }

    #[test]
    fn decomp_only_partitions_stay_distinct() {
        let mut cfg = run_config("foo_ddj");
        cfg.decomp_only = true;
        cfg.devel = true;
        let index = UnitIndex {
            partition: Some(2),
            example: None,
        };
        assert_eq!(container_name(&cfg, index), "x-ddj-foo-2");
    }

    #[test]
    fn every_facet_appears_in_fixed_order() {
        let mut cfg = run_config("bar_ddj");
        cfg.devel = true;
        cfg.staged = true;
        cfg.max_stmt_level = 3;
        cfg.algorithm = Algorithm::Dd;
        cfg.memory = MemoryGb::G64;
        cfg.shuffle_count = 5;
        cfg.optout = true;
        cfg.greedy = true;
        cfg.ignore_test_msg = true;
        let index = UnitIndex {
            partition: Some(4),
            example: Some(9),
        };
        assert_eq!(
            container_name(&cfg, index),
            "x-ddj-bar-s3dd-64G-u5-o-c-g-i-4-ex9"
        );
    }

    #[test]
    fn plain_suppresses_memory_staging_optout_and_split() {
        let mut cfg = run_config("foo_d4j");
        cfg.plain = true;
        cfg.staged = true;
        cfg.optout = true;
        cfg.shuffle_count = 2;
        cfg.greedy = true;
        assert_eq!(
            container_name(&cfg, UnitIndex::default()),
            "d4j-plain-foo-ddmin-u2-g"
        );
    }

    #[test]
    fn simple_split_drops_the_split_token() {
        let mut cfg = run_config("foo_d4j");
        cfg.custom_split = false;
        assert_eq!(container_name(&cfg, UnitIndex::default()), "d4j-foo-ddmin-8G");
    }

    #[test]
    fn names_are_reproducible() {
        let mut cfg = run_config("foo_d4j");
        cfg.staged = true;
        cfg.shuffle_count = 1;
        let index = UnitIndex {
            partition: Some(1),
            example: None,
        };
        assert_eq!(container_name(&cfg, index), container_name(&cfg.clone(), index));
    }

    #[test]
    fn observable_facets_yield_distinct_names() {
        let base = run_config("foo_d4j");
        let mut variants = vec![base.clone()];
        let toggles: [fn(&mut RunConfig); 9] = [
            |c| c.devel = true,
            |c| c.plain = true,
            |c| c.staged = true,
            |c| c.algorithm = Algorithm::Dd,
            |c| c.memory = MemoryGb::G16,
            |c| c.shuffle_count = 1,
            |c| c.optout = true,
            |c| c.greedy = true,
            |c| c.ignore_test_msg = true,
        ];
        for toggle in toggles {
            let mut cfg = base.clone();
            toggle(&mut cfg);
            variants.push(cfg);
        }
        let mut names: Vec<String> = variants
            .iter()
            .map(|cfg| container_name(cfg, UnitIndex::default()))
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
