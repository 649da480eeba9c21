//! Property tests: a directive is activated at most once, whatever the
//! sequence of consent updates and load settlements.

use consent_engine::{ConsentChoice, LoadOutcome};
use consent_tests::{external_script, inline_script, manager};
use consent_types::{ConsentMode, ScriptElement};
use proptest::prelude::*;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SCOPES: [&str; 5] = ["analytics", "marketing", "!analytics", "!marketing", "necessary"];

#[derive(Clone, Debug)]
enum Step {
    /// Accept the categories selected by the mask (bit 0 analytics, bit 1 marketing)
    Update(u8),
    /// Settle the outstanding load, failing it when the flag is set
    Settle(bool),
    /// Re-run activation against the current snapshot
    Rescan,
}

fn arb_scripts() -> impl Strategy<Value = Vec<ScriptElement>> {
    prop::collection::vec((any::<bool>(), 0..SCOPES.len()), 1..12).prop_map(|layout| {
        layout
            .into_iter()
            .enumerate()
            .map(|(i, (external, scope))| {
                let id = format!("s{i}");
                if external {
                    external_script(&id, SCOPES[scope])
                } else {
                    inline_script(&id, SCOPES[scope])
                }
            })
            .collect()
    })
}

fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(
        prop_oneof![
            (0u8..4).prop_map(Step::Update),
            any::<bool>().prop_map(Step::Settle),
            Just(Step::Rescan),
        ],
        1..30,
    )
}

fn choice(mask: u8) -> ConsentChoice {
    let mut categories = Vec::new();
    if mask & 1 != 0 {
        categories.push("analytics");
    }
    if mask & 2 != 0 {
        categories.push("marketing");
    }
    ConsentChoice::accept(categories)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// No placeholder is ever handed to the host twice, and the executed
    /// count matches the number of activations.
    #[test]
    fn directives_activate_at_most_once(
        scripts in arb_scripts(),
        steps in arb_steps(),
        opt_out in any::<bool>(),
    ) {
        let mode = if opt_out { ConsentMode::OptOut } else { ConsentMode::OptIn };
        let mut m = manager(mode);
        let total = m.scan_scripts(scripts).unwrap();
        m.start().unwrap();

        for step in steps {
            match step {
                Step::Update(mask) => {
                    m.update_consent(&choice(mask)).unwrap();
                }
                Step::Settle(failed) => {
                    if let Some(ticket) = m.host_mut().take_ticket() {
                        let outcome = if failed {
                            LoadOutcome::failed("blocked")
                        } else {
                            LoadOutcome::Loaded
                        };
                        m.load_settled(ticket, outcome).unwrap();
                    }
                }
                Step::Rescan => {
                    let executed_before = m.registry().executed_count();
                    m.activate_directives(None).unwrap();
                    prop_assert!(m.registry().executed_count() >= executed_before);
                }
            }

            let placeholders = m.host().activated_placeholders();
            let unique: HashSet<_> = placeholders.iter().collect();
            prop_assert_eq!(unique.len(), placeholders.len());
            prop_assert_eq!(m.registry().executed_count(), placeholders.len());
            prop_assert!(placeholders.len() <= total);
        }
    }
}
