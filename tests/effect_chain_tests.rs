//! Image Effect Chain Tests
//!
//! Tests for the pure ping-pong plan: temporary allocation accounting,
//! the HDR→LDR switch, copy-back decisions, and the release-exactly-once
//! invariant the executor's drop guard relies on.

use prowl::renderer::graph::effects::{ChainPlan, SlotId};

// ============================================================================
// Shape
// ============================================================================

#[test]
fn empty_chain_plans_nothing() {
    let plan = ChainPlan::build(&[], true);
    assert!(plan.steps.is_empty());
    assert!(plan.temps.is_empty());
    assert_eq!(plan.copy_back, None);
}

#[test]
fn single_hdr_effect_lands_in_temp_and_copies_back() {
    let plan = ChainPlan::build(&[false], true);
    assert_eq!(plan.temps.len(), 1);
    assert!(!plan.temps[0].ldr);
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].source, SlotId::Forward);
    assert_eq!(plan.steps[0].dest, SlotId::Temp(0));
    assert_eq!(plan.copy_back, Some(SlotId::Temp(0)));
}

#[test]
fn even_chains_end_in_the_forward_buffer() {
    let plan = ChainPlan::build(&[false, false], true);
    assert_eq!(plan.temps.len(), 1);
    assert_eq!(plan.steps[1].dest, SlotId::Forward);
    assert_eq!(plan.copy_back, None);
}

#[test]
fn sources_always_chain_from_previous_dest() {
    let plan = ChainPlan::build(&[false, false, false, false], true);
    for pair in plan.steps.windows(2) {
        assert_eq!(pair[1].source, pair[0].dest);
    }
}

// ============================================================================
// HDR → LDR
// ============================================================================

#[test]
fn first_effect_forcing_ldr_gets_ldr_destination() {
    let plan = ChainPlan::build(&[true], true);
    assert_eq!(plan.temps.len(), 1);
    assert!(plan.temps[0].ldr);
}

#[test]
fn ldr_switch_mid_chain_swaps_in_fresh_buffer() {
    // bloom (HDR) → tonemap (LDR) → fxaa (LDR-preserving)
    let plan = ChainPlan::build(&[false, true, false], true);

    assert!(!plan.temps[0].ldr);
    let ldr_temps: Vec<_> = plan.temps.iter().filter(|t| t.ldr).collect();
    assert!(!ldr_temps.is_empty(), "the switch must allocate an LDR temp");

    // The tonemapper itself must write into an LDR destination, not the
    // HDR forward buffer its ping-pong position would have given it.
    let tonemap = &plan.steps[1];
    match tonemap.dest {
        SlotId::Temp(index) => assert!(plan.temps[index].ldr),
        SlotId::Forward => panic!("tonemapper must not write the HDR forward buffer"),
    }
}

#[test]
fn ldr_source_never_allocates_hdr_temps() {
    let plan = ChainPlan::build(&[false, false], false);
    assert!(plan.temps.iter().all(|t| t.ldr));
}

// ============================================================================
// Release Accounting
// ============================================================================

#[test]
fn early_releases_are_unique_and_valid() {
    for flags in [
        vec![false, true],
        vec![false, false, true],
        vec![true, true],
        vec![false, true, false, true],
    ] {
        let plan = ChainPlan::build(&flags, true);

        let releases: Vec<usize> = plan.steps.iter().filter_map(|s| s.release_before).collect();
        let mut deduped = releases.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(releases.len(), deduped.len(), "double release in {flags:?}");

        for index in releases {
            assert!(index < plan.temps.len(), "release of unknown temp");
        }
    }
}

#[test]
fn released_temps_are_never_used_again() {
    for flags in [
        vec![false, true],
        vec![false, false, true, false],
        vec![false, true, true],
    ] {
        let plan = ChainPlan::build(&flags, true);

        let mut released: Vec<usize> = Vec::new();
        for step in &plan.steps {
            if let Some(index) = step.release_before {
                released.push(index);
            }
            for slot in [step.source, step.dest] {
                if let SlotId::Temp(index) = slot {
                    assert!(
                        !released.contains(&index),
                        "step {step:?} touches released temp in {flags:?}"
                    );
                }
            }
        }
        if let Some(SlotId::Temp(index)) = plan.copy_back {
            assert!(!released.contains(&index));
        }
    }
}
