//! Blessforge Headless Validation Harness
//!
//! Exercises the build-rules engine end to end against the built-in
//! Blessing catalog and a sample sub-build library. Runs entirely
//! in-process — no UI, no storage, no networking.
//!
//! Usage:
//!   cargo run -p blessforge-simtest
//!   cargo run -p blessforge-simtest -- --verbose

use blessforge_logic::action::Action;
use blessforge_logic::catalog;
use blessforge_logic::content::validate_group;
use blessforge_logic::crossref::{
    assignment_status, list_eligible, LibraryEntry, SubBuildLibrary, TagFilter,
};
use blessforge_logic::error::EngineError;
use blessforge_logic::ledger::{Currency, MetaKind, SigilKind};
use blessforge_logic::session::Session;
use blessforge_logic::snapshot::{load_session, save_session};

// ── Sample sub-build library (what a persistence layer would serve) ─────
const LIBRARY_JSON: &str = include_str!("../../../data/subbuild_library.json");

const PURTH: Currency = Currency::Sigil(SigilKind::Purth);
const SOLUN: Currency = Currency::Sigil(SigilKind::Solun);
const KYRRIN: Currency = Currency::Sigil(SigilKind::Kyrrin);
const BP: Currency = Currency::Meta(MetaKind::BlessingPoints);
const FP: Currency = Currency::Meta(MetaKind::FortunePoints);

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(results: &mut Vec<TestResult>, name: &str, passed: bool, detail: String) {
    results.push(TestResult {
        name: name.into(),
        passed,
        detail,
    });
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Blessforge Validation Harness ===\n");

    let library = match load_library() {
        Ok(lib) => lib,
        Err(e) => {
            eprintln!("library parse error: {e}");
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Catalog content validation
    results.extend(validate_catalog());

    // 2. Fireborn walkthrough: tree, shared bonus, symmetry
    results.extend(validate_fireborn_walkthrough(&library));

    // 3. Boost, override, and magician sweep
    results.extend(validate_modifiers(&library));

    // 4. Cross-reference budgets against the sample library
    results.extend(validate_crossref(&library));

    // 5. Snapshot round trip
    results.extend(validate_snapshot(&library));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_library() -> Result<SubBuildLibrary, serde_json::Error> {
    let entries: Vec<LibraryEntry> = serde_json::from_str(LIBRARY_JSON)?;
    let mut library = SubBuildLibrary::new();
    for entry in entries {
        library.insert(entry);
    }
    Ok(library)
}

// ── 1. Catalog content ──────────────────────────────────────────────────

fn validate_catalog() -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();

    let groups = catalog::blessings();
    check(
        &mut results,
        "catalog_size",
        groups.len() == 10,
        format!("{} blessings loaded", groups.len()),
    );

    for group in &groups {
        let errors = validate_group(group);
        check(
            &mut results,
            &format!("content_valid_{}", group.id),
            errors.is_empty(),
            if errors.is_empty() {
                "no content errors".into()
            } else {
                format!("{errors:?}")
            },
        );
    }

    // Configuration survives a JSON round trip unchanged.
    let round_trip_ok = groups.iter().all(|g| {
        serde_json::to_string(g)
            .ok()
            .and_then(|json| serde_json::from_str::<blessforge_logic::content::GroupConfig>(&json).ok())
            .is_some_and(|back| back == *g)
    });
    check(
        &mut results,
        "catalog_json_round_trip",
        round_trip_ok,
        "all groups round-trip through JSON".into(),
    );

    results
}

// ── 2. Fireborn walkthrough ─────────────────────────────────────────────

fn validate_fireborn_walkthrough(library: &SubBuildLibrary) -> Vec<TestResult> {
    println!("--- Fireborn Walkthrough ---");
    let mut results = Vec::new();
    let mut session = Session::standard();
    session.ledger.credit(PURTH, 4);
    session.ledger.credit(SOLUN, 1);

    // Prerequisites gate the crown until the heart is lit.
    let premature = session.apply(
        library,
        "fireborn",
        &Action::SelectNode {
            node: "ashen_crown".into(),
        },
    );
    check(
        &mut results,
        "prereq_gate",
        matches!(premature, Err(EngineError::PrerequisiteNotMet { .. })),
        format!("{premature:?}"),
    );

    for node in ["ember_heart", "ashen_crown", "pyre_dance", "twin_flame"] {
        let r = session.apply(
            library,
            "fireborn",
            &Action::SelectNode { node: node.into() },
        );
        check(&mut results, &format!("select_{node}"), r.is_ok(), format!("{r:?}"));
    }
    check(
        &mut results,
        "sigils_spent",
        session.ledger.get(PURTH) == 0 && session.ledger.get(SOLUN) == 0,
        format!(
            "purth={} solun={}",
            session.ledger.get(PURTH),
            session.ledger.get(SOLUN)
        ),
    );

    // 3 from nodes + 1 shared bonus on offer.
    let flames = session.available_quota("fireborn", "flames");
    let smoke = session.available_quota("fireborn", "smoke");
    check(
        &mut results,
        "derived_quotas",
        flames == 4 && smoke == 1,
        format!("flames={flames} smoke={smoke}"),
    );

    // Smoke grabs the shared bonus; the flames offer shrinks.
    session
        .apply(
            library,
            "fireborn",
            &Action::ToggleOption {
                category: "smoke".into(),
                option: "smoke_form".into(),
            },
        )
        .expect("smoke pick");
    let flames_after = session.available_quota("fireborn", "flames");
    check(
        &mut results,
        "shared_bonus_claimed",
        flames_after == 3,
        format!("flames={flames_after} after smoke claimed the twin flame"),
    );

    // Deselecting the granting node while the bonus is in use is refused.
    let load_bearing = session.apply(
        library,
        "fireborn",
        &Action::DeselectNode {
            node: "twin_flame".into(),
        },
    );
    check(
        &mut results,
        "load_bearing_deselect",
        matches!(load_bearing, Err(EngineError::QuotaWouldBeExceeded { .. })),
        format!("{load_bearing:?}"),
    );

    // Unwind everything; balances must come back exactly.
    session
        .apply(
            library,
            "fireborn",
            &Action::ToggleOption {
                category: "smoke".into(),
                option: "smoke_form".into(),
            },
        )
        .expect("smoke unpick");
    for node in ["twin_flame", "pyre_dance", "ashen_crown", "ember_heart"] {
        session
            .apply(
                library,
                "fireborn",
                &Action::DeselectNode { node: node.into() },
            )
            .expect("unwind");
    }
    check(
        &mut results,
        "debit_credit_symmetry",
        session.ledger.get(PURTH) == 4 && session.ledger.get(SOLUN) == 1,
        format!(
            "purth={} solun={}",
            session.ledger.get(PURTH),
            session.ledger.get(SOLUN)
        ),
    );

    results
}

// ── 3. Boosts, override, magician ───────────────────────────────────────

fn validate_modifiers(library: &SubBuildLibrary) -> Vec<TestResult> {
    println!("--- Modifiers ---");
    let mut results = Vec::new();
    let mut session = Session::standard();
    session.ledger.credit(PURTH, 4);
    session.ledger.credit(SOLUN, 2);
    session.ledger.credit(BP, 5);
    session.ledger.credit(FP, 5);

    // Override makes an unaffordable node selectable at balance 0.
    let mut broke = Session::standard();
    broke
        .apply(
            library,
            "fireborn",
            &Action::SetOverride {
                node: "ember_heart".into(),
                on: true,
            },
        )
        .expect("override");
    check(
        &mut results,
        "override_precedence",
        broke.is_selectable("fireborn", "ember_heart"),
        "selectable with every balance at zero".into(),
    );

    // Boost variant switch is atomic.
    session
        .apply(
            library,
            "fireborn",
            &Action::SetBoost {
                key: "inferno".into(),
                variant: Some(SigilKind::Purth),
            },
        )
        .expect("boost on");
    let solun_before = session.ledger.get(SOLUN);
    session
        .apply(
            library,
            "fireborn",
            &Action::SetBoost {
                key: "inferno".into(),
                variant: Some(SigilKind::Solun),
            },
        )
        .expect("variant switch");
    check(
        &mut results,
        "variant_switch",
        session.ledger.get(SOLUN) == solun_before - 1
            && session.ledger.get(PURTH) == 4,
        format!(
            "purth={} solun={}",
            session.ledger.get(PURTH),
            session.ledger.get(SOLUN)
        ),
    );

    // Magician: tree cost 5 → 1 BP; three Purth nodes → floor(18/4) = 4 FP.
    for node in ["ember_heart", "ashen_crown", "pyre_dance", "twin_flame"] {
        session
            .apply(
                library,
                "fireborn",
                &Action::SelectNode { node: node.into() },
            )
            .expect("tree");
    }
    session
        .apply(library, "fireborn", &Action::SetMagician { on: true })
        .expect("magician on");
    let charged = (5 - session.ledger.get(BP), 5 - session.ledger.get(FP));
    check(
        &mut results,
        "magician_charge",
        charged == (1, 4),
        format!("charged {charged:?} (BP, FP)"),
    );

    session
        .apply(library, "fireborn", &Action::SetMagician { on: false })
        .expect("magician off");
    check(
        &mut results,
        "magician_refund",
        session.ledger.get(BP) == 5 && session.ledger.get(FP) == 5,
        format!("bp={} fp={}", session.ledger.get(BP), session.ledger.get(FP)),
    );

    results
}

// ── 4. Cross-reference budgets ──────────────────────────────────────────

fn validate_crossref(library: &SubBuildLibrary) -> Vec<TestResult> {
    println!("--- Cross-Reference ---");
    let mut results = Vec::new();
    let mut session = Session::standard();
    session.ledger.credit(KYRRIN, 1);

    // Lightbringer's herald slot: base budget 40, +30 with the boost.
    let base_listing = list_eligible(library, "companion", 40, &TagFilter::default());
    check(
        &mut results,
        "listing_base_budget",
        base_listing.len() == 3,
        format!(
            "{:?}",
            base_listing.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
        ),
    );

    let over = session.apply(
        library,
        "lightbringer",
        &Action::AssignSlot {
            slot: "herald".into(),
            name: "Vesper".into(),
        },
    );
    check(
        &mut results,
        "over_budget_assign_rejected",
        matches!(over, Err(EngineError::IneligibleAssignment { .. })),
        format!("{over:?}"),
    );

    session
        .apply(
            library,
            "lightbringer",
            &Action::SetBoost {
                key: "exalted".into(),
                variant: Some(SigilKind::Kyrrin),
            },
        )
        .expect("exalted on");
    let boosted_listing = list_eligible(library, "companion", 70, &TagFilter::default());
    check(
        &mut results,
        "listing_boosted_budget",
        boosted_listing.len() == 5,
        format!("{} eligible at budget 70", boosted_listing.len()),
    );

    session
        .apply(
            library,
            "lightbringer",
            &Action::AssignSlot {
                slot: "herald".into(),
                name: "Vesper".into(),
            },
        )
        .expect("assign within boosted budget");

    // Dropping the boost flags the assignment but keeps it.
    session
        .apply(
            library,
            "lightbringer",
            &Action::SetBoost {
                key: "exalted".into(),
                variant: None,
            },
        )
        .expect("exalted off");
    let config = session.config("lightbringer").expect("config");
    let state = session.state("lightbringer").expect("state");
    let status = assignment_status(config, state, library, "herald");
    check(
        &mut results,
        "budget_shrink_flags_not_deletes",
        status.as_ref().is_some_and(|s| s.over_budget && s.name == "Vesper"),
        format!("{status:?}"),
    );

    results
}

// ── 5. Snapshot ─────────────────────────────────────────────────────────

fn validate_snapshot(library: &SubBuildLibrary) -> Vec<TestResult> {
    println!("--- Snapshot ---");
    let mut results = Vec::new();
    let mut session = Session::standard();
    session.ledger.credit(PURTH, 2);
    session
        .apply(
            library,
            "fireborn",
            &Action::SelectNode {
                node: "ember_heart".into(),
            },
        )
        .expect("select");

    let mut buf = Vec::new();
    let saved = save_session(&session, &mut buf);
    check(
        &mut results,
        "snapshot_save",
        saved.is_ok(),
        format!("{} bytes", buf.len()),
    );

    let mut restored = Session::standard();
    let loaded = load_session(&mut restored, buf.as_slice());
    check(
        &mut results,
        "snapshot_load",
        loaded.is_ok()
            && restored.ledger == session.ledger
            && restored.groups == session.groups,
        format!("{loaded:?}"),
    );

    results
}
