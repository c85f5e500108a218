//! Built-in Blessing catalog.
//!
//! Ten feature groups sharing one rule shape, differing only in their
//! bindings: tree layout, sigil kinds, category quotas, boost variants,
//! shared bonuses, and cross-reference slots. All of them run through the
//! same engine — nothing in here is logic, only configuration values.
//!
//! Hosts with their own content can ignore this module entirely and load
//! [`GroupConfig`] values from JSON instead.

use std::collections::BTreeMap;

use crate::content::{
    BoostDef, CategoryDef, GroupConfig, NodeDef, OptionDef, SharedBonusDef, SlotDef,
};
use crate::ledger::SigilKind;

fn node(
    id: &str,
    name: &str,
    prereqs: &[&str],
    cost_kind: SigilKind,
    cost: u32,
    benefits: &[(&str, u32)],
) -> NodeDef {
    NodeDef {
        id: id.into(),
        name: name.into(),
        prereqs: prereqs.iter().map(|p| p.to_string()).collect(),
        cost_kind,
        cost,
        benefits: benefits
            .iter()
            .map(|(c, n)| (c.to_string(), *n))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn opt(id: &str, name: &str) -> OptionDef {
    OptionDef {
        id: id.into(),
        name: name.into(),
        requires: vec![],
    }
}

fn opt_req(id: &str, name: &str, requires: &[&str]) -> OptionDef {
    OptionDef {
        id: id.into(),
        name: name.into(),
        requires: requires.iter().map(|r| r.to_string()).collect(),
    }
}

fn cat(id: &str, name: &str, base_quota: u32, options: Vec<OptionDef>) -> CategoryDef {
    CategoryDef {
        id: id.into(),
        name: name.into(),
        base_quota,
        options,
    }
}

/// All ten Blessings.
pub fn blessings() -> Vec<GroupConfig> {
    vec![
        fireborn(),
        tidebound(),
        stormsworn(),
        earthwarden(),
        shadowveil(),
        lightbringer(),
        beastkin(),
        forgemaster(),
        dreamweaver(),
        wayfarer(),
    ]
}

/// Look up one Blessing by id.
pub fn blessing(id: &str) -> Option<GroupConfig> {
    blessings().into_iter().find(|g| g.id == id)
}

/// Fire magic. Carries the catalog's one shared bonus: Twin Flame grants
/// a single extra pick usable by either Flames or Smoke, whichever claims
/// it first.
fn fireborn() -> GroupConfig {
    GroupConfig {
        id: "fireborn".into(),
        name: "Fireborn".into(),
        special_sigil: SigilKind::Purth,
        nodes: vec![
            node("ember_heart", "Ember Heart", &[], SigilKind::Purth, 1, &[]),
            node(
                "ashen_crown",
                "Ashen Crown",
                &["ember_heart"],
                SigilKind::Purth,
                1,
                &[("flames", 1)],
            ),
            node(
                "twin_flame",
                "Twin Flame",
                &["ember_heart"],
                SigilKind::Solun,
                1,
                &[],
            ),
            node(
                "pyre_dance",
                "Pyre Dance",
                &["ashen_crown"],
                SigilKind::Purth,
                2,
                &[("flames", 2)],
            ),
        ],
        categories: vec![
            cat(
                "flames",
                "Flames",
                0,
                vec![
                    opt("flame_whip", "Flame Whip"),
                    opt("flame_shield", "Flame Shield"),
                    opt("cinder_step", "Cinder Step"),
                    opt_req("ember_veil", "Ember Veil", &["flame_shield"]),
                ],
            ),
            cat(
                "smoke",
                "Smoke",
                0,
                vec![
                    opt("smoke_form", "Smoke Form"),
                    opt("choking_cloud", "Choking Cloud"),
                ],
            ),
        ],
        boosts: vec![BoostDef {
            key: "inferno".into(),
            categories: vec!["flames".into()],
            bonus: 1,
            variants: vec![SigilKind::Purth, SigilKind::Solun],
        }],
        shared_bonus: Some(SharedBonusDef {
            node: "twin_flame".into(),
            categories: vec!["flames".into(), "smoke".into()],
            bonus: 1,
            capacity: 1,
        }),
        slots: vec![],
    }
}

/// Water and depth magic.
fn tidebound() -> GroupConfig {
    GroupConfig {
        id: "tidebound".into(),
        name: "Tidebound".into(),
        special_sigil: SigilKind::Solun,
        nodes: vec![
            node("deep_call", "Deep Call", &[], SigilKind::Solun, 1, &[]),
            node(
                "current_mastery",
                "Current Mastery",
                &["deep_call"],
                SigilKind::Solun,
                1,
                &[("tides", 1)],
            ),
            node(
                "abyssal_gift",
                "Abyssal Gift",
                &["current_mastery"],
                SigilKind::Umbra,
                2,
                &[("tides", 1), ("depths", 1)],
            ),
        ],
        categories: vec![
            cat(
                "tides",
                "Tides",
                0,
                vec![
                    opt("wave_break", "Wave Break"),
                    opt("undertow", "Undertow"),
                    opt("mist_walk", "Mist Walk"),
                ],
            ),
            cat(
                "depths",
                "Depths",
                0,
                vec![
                    opt_req("pressure_grip", "Pressure Grip", &["undertow"]),
                    opt("black_water", "Black Water"),
                ],
            ),
        ],
        boosts: vec![BoostDef {
            key: "tide_surge".into(),
            categories: vec!["tides".into()],
            bonus: 1,
            variants: vec![SigilKind::Solun],
        }],
        shared_bonus: None,
        slots: vec![],
    }
}

/// Storm magic — the widest tree, with a two-prerequisite capstone.
fn stormsworn() -> GroupConfig {
    GroupConfig {
        id: "stormsworn".into(),
        name: "Stormsworn".into(),
        special_sigil: SigilKind::Tessel,
        nodes: vec![
            node("sky_brand", "Sky Brand", &[], SigilKind::Tessel, 1, &[]),
            node(
                "thunder_core",
                "Thunder Core",
                &["sky_brand"],
                SigilKind::Tessel,
                1,
                &[("storms", 1)],
            ),
            node(
                "gale_wings",
                "Gale Wings",
                &["sky_brand"],
                SigilKind::Verdis,
                1,
                &[("storms", 1)],
            ),
            node(
                "eye_of_storm",
                "Eye of the Storm",
                &["thunder_core", "gale_wings"],
                SigilKind::Tessel,
                2,
                &[("storms", 2)],
            ),
        ],
        categories: vec![cat(
            "storms",
            "Storms",
            0,
            vec![
                opt("chain_arc", "Chain Arc"),
                opt("static_field", "Static Field"),
                opt("squall_line", "Squall Line"),
                opt_req("wind_rider", "Wind Rider", &["gale_wings"]),
                opt("white_noise", "White Noise"),
            ],
        )],
        boosts: vec![BoostDef {
            key: "stormcall".into(),
            categories: vec!["storms".into()],
            bonus: 1,
            variants: vec![SigilKind::Tessel, SigilKind::Verdis],
        }],
        shared_bonus: None,
        slots: vec![],
    }
}

/// Earth and growth magic, with a bonded grove beast.
fn earthwarden() -> GroupConfig {
    GroupConfig {
        id: "earthwarden".into(),
        name: "Earthwarden".into(),
        special_sigil: SigilKind::Verdis,
        nodes: vec![
            node("root_bond", "Root Bond", &[], SigilKind::Verdis, 1, &[]),
            node(
                "stone_skin",
                "Stone Skin",
                &["root_bond"],
                SigilKind::Verdis,
                1,
                &[("wards", 1)],
            ),
            node(
                "verdant_pulse",
                "Verdant Pulse",
                &["root_bond"],
                SigilKind::Verdis,
                1,
                &[("wards", 1), ("groves", 1)],
            ),
        ],
        categories: vec![
            cat(
                "wards",
                "Wards",
                0,
                vec![
                    opt("bark_mail", "Bark Mail"),
                    opt("tremor_sense", "Tremor Sense"),
                    opt("bramble_wall", "Bramble Wall"),
                ],
            ),
            cat(
                "groves",
                "Groves",
                0,
                vec![
                    opt("heartwood", "Heartwood"),
                    opt("mycelial_web", "Mycelial Web"),
                ],
            ),
        ],
        boosts: vec![BoostDef {
            key: "wild_growth".into(),
            categories: vec!["groves".into()],
            bonus: 1,
            variants: vec![SigilKind::Verdis],
        }],
        shared_bonus: None,
        slots: vec![SlotDef {
            id: "grove_beast".into(),
            category: "beast".into(),
            base_budget: 30,
            boost_budget: Some(("wild_growth".into(), 20)),
            include_tags: vec![],
            exclude_tags: vec!["tainted".into()],
            required_tag: None,
        }],
    }
}

/// Shadow magic.
fn shadowveil() -> GroupConfig {
    GroupConfig {
        id: "shadowveil".into(),
        name: "Shadowveil".into(),
        special_sigil: SigilKind::Umbra,
        nodes: vec![
            node("veil_step", "Veil Step", &[], SigilKind::Umbra, 1, &[]),
            node(
                "night_sight",
                "Night Sight",
                &["veil_step"],
                SigilKind::Umbra,
                1,
                &[("shadows", 1)],
            ),
            node(
                "umbral_pact",
                "Umbral Pact",
                &["night_sight"],
                SigilKind::Umbra,
                2,
                &[("shadows", 2)],
            ),
        ],
        categories: vec![cat(
            "shadows",
            "Shadows",
            0,
            vec![
                opt("gloom_blade", "Gloom Blade"),
                opt("silent_mark", "Silent Mark"),
                opt_req("deep_dark", "Deep Dark", &["silent_mark"]),
                opt("half_light", "Half Light"),
            ],
        )],
        boosts: vec![],
        shared_bonus: None,
        slots: vec![],
    }
}

/// Light magic, with a herald companion.
fn lightbringer() -> GroupConfig {
    GroupConfig {
        id: "lightbringer".into(),
        name: "Lightbringer".into(),
        special_sigil: SigilKind::Kyrrin,
        nodes: vec![
            node("dawn_sigil", "Dawn Sigil", &[], SigilKind::Kyrrin, 1, &[]),
            node(
                "radiant_edge",
                "Radiant Edge",
                &["dawn_sigil"],
                SigilKind::Kyrrin,
                1,
                &[("graces", 1)],
            ),
            node(
                "halo_crown",
                "Halo Crown",
                &["radiant_edge"],
                SigilKind::Kyrrin,
                2,
                &[("graces", 1)],
            ),
        ],
        categories: vec![cat(
            "graces",
            "Graces",
            0,
            vec![
                opt("guiding_beam", "Guiding Beam"),
                opt("sun_ward", "Sun Ward"),
                opt("clear_sight", "Clear Sight"),
            ],
        )],
        boosts: vec![BoostDef {
            key: "exalted".into(),
            categories: vec!["graces".into()],
            bonus: 1,
            variants: vec![SigilKind::Kyrrin],
        }],
        shared_bonus: None,
        slots: vec![SlotDef {
            id: "herald".into(),
            category: "companion".into(),
            base_budget: 40,
            boost_budget: Some(("exalted".into(), 30)),
            include_tags: vec![],
            exclude_tags: vec![],
            required_tag: None,
        }],
    }
}

/// Beast magic, with a bonded beast slot that refuses domestic stock.
fn beastkin() -> GroupConfig {
    GroupConfig {
        id: "beastkin".into(),
        name: "Beastkin".into(),
        special_sigil: SigilKind::Verdis,
        nodes: vec![
            node("wild_tongue", "Wild Tongue", &[], SigilKind::Verdis, 1, &[]),
            node(
                "pack_bond",
                "Pack Bond",
                &["wild_tongue"],
                SigilKind::Verdis,
                1,
                &[("instincts", 1)],
            ),
            node(
                "apex_form",
                "Apex Form",
                &["pack_bond"],
                SigilKind::Umbra,
                2,
                &[("instincts", 2)],
            ),
        ],
        categories: vec![cat(
            "instincts",
            "Instincts",
            0,
            vec![
                opt("scent_trail", "Scent Trail"),
                opt("night_prowl", "Night Prowl"),
                opt("iron_jaw", "Iron Jaw"),
                opt_req("blood_frenzy", "Blood Frenzy", &["apex_form"]),
            ],
        )],
        boosts: vec![BoostDef {
            key: "alpha_call".into(),
            categories: vec!["instincts".into()],
            bonus: 1,
            variants: vec![SigilKind::Verdis, SigilKind::Umbra],
        }],
        shared_bonus: None,
        slots: vec![SlotDef {
            id: "bonded_beast".into(),
            category: "beast".into(),
            base_budget: 40,
            boost_budget: Some(("alpha_call".into(), 30)),
            include_tags: vec![],
            exclude_tags: vec!["domestic".into()],
            required_tag: None,
        }],
    }
}

/// Smithing magic, with a masterwork weapon slot.
fn forgemaster() -> GroupConfig {
    GroupConfig {
        id: "forgemaster".into(),
        name: "Forgemaster".into(),
        special_sigil: SigilKind::Tessel,
        nodes: vec![
            node("forge_heart", "Forge Heart", &[], SigilKind::Tessel, 1, &[]),
            node(
                "rune_etching",
                "Rune Etching",
                &["forge_heart"],
                SigilKind::Tessel,
                1,
                &[("runes", 1)],
            ),
            node(
                "master_smith",
                "Master Smith",
                &["rune_etching"],
                SigilKind::Tessel,
                2,
                &[("runes", 1)],
            ),
        ],
        categories: vec![cat(
            "runes",
            "Runes",
            0,
            vec![
                opt("keen_edge", "Keen Edge"),
                opt("unbreaking", "Unbreaking"),
                opt_req("soul_brand", "Soul Brand", &["forge_heart"]),
            ],
        )],
        boosts: vec![BoostDef {
            key: "temper".into(),
            categories: vec!["runes".into()],
            bonus: 1,
            variants: vec![SigilKind::Tessel],
        }],
        shared_bonus: None,
        slots: vec![SlotDef {
            id: "masterwork".into(),
            category: "weapon".into(),
            base_budget: 50,
            boost_budget: None,
            include_tags: vec!["forged".into()],
            exclude_tags: vec![],
            required_tag: None,
        }],
    }
}

/// Dream magic.
fn dreamweaver() -> GroupConfig {
    GroupConfig {
        id: "dreamweaver".into(),
        name: "Dreamweaver".into(),
        special_sigil: SigilKind::Umbra,
        nodes: vec![
            node("lucid_gate", "Lucid Gate", &[], SigilKind::Umbra, 1, &[]),
            node(
                "weave_sight",
                "Weave Sight",
                &["lucid_gate"],
                SigilKind::Solun,
                1,
                &[("dreams", 1)],
            ),
            node(
                "nightmare_hold",
                "Nightmare Hold",
                &["weave_sight"],
                SigilKind::Umbra,
                1,
                &[("dreams", 1), ("omens", 1)],
            ),
        ],
        categories: vec![
            cat(
                "dreams",
                "Dreams",
                0,
                vec![
                    opt("sleep_walk", "Sleep Walk"),
                    opt("memory_thread", "Memory Thread"),
                    opt("false_waking", "False Waking"),
                ],
            ),
            cat(
                "omens",
                "Omens",
                0,
                vec![
                    opt_req("dread_portent", "Dread Portent", &["memory_thread"]),
                    opt("silver_thread", "Silver Thread"),
                ],
            ),
        ],
        boosts: vec![],
        shared_bonus: None,
        slots: vec![],
    }
}

/// Travel magic, with a mount slot.
fn wayfarer() -> GroupConfig {
    GroupConfig {
        id: "wayfarer".into(),
        name: "Wayfarer".into(),
        special_sigil: SigilKind::Kyrrin,
        nodes: vec![
            node("open_road", "Open Road", &[], SigilKind::Kyrrin, 1, &[]),
            node(
                "star_map",
                "Star Map",
                &["open_road"],
                SigilKind::Kyrrin,
                1,
                &[("paths", 1)],
            ),
            node(
                "worldwalk",
                "Worldwalk",
                &["star_map"],
                SigilKind::Tessel,
                2,
                &[("paths", 2)],
            ),
        ],
        categories: vec![cat(
            "paths",
            "Paths",
            0,
            vec![
                opt("sure_footing", "Sure Footing"),
                opt("wayfinder", "Wayfinder"),
                opt("door_in_the_air", "Door in the Air"),
                opt("last_league", "Last League"),
            ],
        )],
        boosts: vec![BoostDef {
            key: "far_rider".into(),
            categories: vec!["paths".into()],
            bonus: 1,
            variants: vec![SigilKind::Kyrrin, SigilKind::Tessel],
        }],
        shared_bonus: None,
        slots: vec![SlotDef {
            id: "mount".into(),
            category: "vehicle".into(),
            base_budget: 35,
            boost_budget: Some(("far_rider".into(), 25)),
            include_tags: vec![],
            exclude_tags: vec![],
            required_tag: None,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_blessings_with_unique_ids() {
        let groups = blessings();
        assert_eq!(groups.len(), 10);
        let mut ids: Vec<_> = groups.iter().map(|g| g.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(blessing("fireborn").unwrap().name, "Fireborn");
        assert!(blessing("sunborn").is_none());
    }

    #[test]
    fn only_fireborn_carries_the_shared_bonus() {
        for group in blessings() {
            assert_eq!(group.shared_bonus.is_some(), group.id == "fireborn");
        }
    }

    #[test]
    fn every_group_has_nodes_and_categories() {
        for group in blessings() {
            assert!(!group.nodes.is_empty(), "{}", group.id);
            assert!(!group.categories.is_empty(), "{}", group.id);
            // Every group has at least one root node.
            assert!(
                group.nodes.iter().any(|n| n.prereqs.is_empty()),
                "{}",
                group.id
            );
        }
    }

    #[test]
    fn slot_categories_are_the_known_library_kinds() {
        let known = ["companion", "beast", "vehicle", "weapon"];
        for group in blessings() {
            for slot in &group.slots {
                assert!(known.contains(&slot.category.as_str()), "{}", slot.id);
            }
        }
    }
}
