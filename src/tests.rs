use crate::error::UpdateError;
use crate::formatter::{Options, SayMode, Updater};
use crate::parser::{parse_compound, parse_document, parse_value};
use crate::selector::parse_selector;
use crate::value::{json_string, value_string, Value};

// ── Shared fixture runner ───────────────────────────────────────────

/// Embed fixture files at compile time.
const COMMAND_FIXTURES: &str = include_str!("../test-data/fixtures/commands.json");

fn updater_for(fixture: &serde_json::Value) -> Updater {
    let say_mode = match fixture.get("say").and_then(|v| v.as_str()) {
        Some("text") => SayMode::Text,
        Some("translate") => SayMode::Translate,
        _ => SayMode::Keep,
    };
    let remap_ids = !fixture
        .get("noRemap")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    Updater::new(Options { say_mode, remap_ids })
}

#[test]
fn test_fixture_commands() {
    let fixtures: Vec<serde_json::Value> = serde_json::from_str(COMMAND_FIXTURES).unwrap();

    for fixture in &fixtures {
        let name = fixture["name"].as_str().unwrap();
        let input = fixture["input"].as_str().unwrap();
        let expected = fixture["expected"].as_str().unwrap();

        let updater = updater_for(fixture);
        let actual = updater
            .format_command(input)
            .unwrap_or_else(|err| panic!("Fixture '{}': unexpected error: {}", name, err));
        assert_eq!(actual, expected, "Fixture '{}'", name);
    }
}

// ── Parser ──────────────────────────────────────────────────────────

fn parsed(input: &str) -> Value {
    let (end, value) = parse_value(input, 0).unwrap();
    assert_eq!(end, input.len(), "parser stopped early on {:?}", input);
    value
}

#[test]
fn test_parse_round_trip() {
    for input in [
        "{id:Pig,Health:10s}",
        "{Items:[{id:267,Count:1b},{id:310}]}",
        "{display:{Name:\"A \\\"named\\\" sword\"}}",
        "[1,2,3]",
        "{Tags:[a,b],NoAI:1b}",
    ] {
        assert_eq!(value_string(&parsed(input)), input);
    }
}

#[test]
fn test_parse_whitespace_in_keys() {
    let value = parsed("{ id : Pig , Health : 10 }");
    let map = value.as_compound().unwrap();
    assert_eq!(map["id"].as_scalar(), Some(" Pig "));
    assert!(map.contains_key("Health"));
}

#[test]
fn test_parse_trailing_comma() {
    let value = parsed("{id:Pig,}");
    assert_eq!(value_string(&value), "{id:Pig}");
}

#[test]
fn test_parse_unterminated_compound() {
    let err = parse_compound("{id:Pig", 0).unwrap_err();
    assert!(matches!(err, UpdateError::UnterminatedCompound { .. }), "{:?}", err);
}

#[test]
fn test_parse_unterminated_list() {
    let err = parse_value("[a,b", 0).unwrap_err();
    assert!(matches!(err, UpdateError::UnterminatedList { .. }), "{:?}", err);
}

#[test]
fn test_parse_unterminated_string() {
    let err = parse_value("\"abc", 0).unwrap_err();
    assert!(matches!(err, UpdateError::UnterminatedString { .. }), "{:?}", err);
}

#[test]
fn test_parse_missing_separator() {
    let err = parse_compound("{name:[a,b]other:x}", 0).unwrap_err();
    match err {
        UpdateError::ExpectedChar {
            expected, found, ..
        } => {
            assert_eq!(expected, ',');
            assert_eq!(found, Some('o'));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_parse_document_rejects_scalar() {
    let err = parse_document("hello").unwrap_err();
    assert!(matches!(err, UpdateError::InvalidJson { .. }), "{:?}", err);
}

// ── JSON dialect ────────────────────────────────────────────────────

#[test]
fn test_json_quoting() {
    let value = parsed("{text:hi,bold:true,score:-3,ratio:0.5,quoted:\"x\"}");
    assert_eq!(
        json_string(&value),
        "{\"text\":\"hi\",\"bold\":true,\"score\":-3,\"ratio\":0.5,\"quoted\":\"x\"}"
    );
}

// ── Selector ────────────────────────────────────────────────────────

#[test]
fn test_selector_non_selector() {
    assert_eq!(parse_selector("Steve").unwrap(), None);
    assert_eq!(parse_selector("@x[type=Pig]").unwrap(), None);
}

#[test]
fn test_selector_implicit_keys() {
    let sel = parse_selector("@e[10,20,30,5]").unwrap().unwrap();
    assert_eq!(sel.kind, 'e');
    assert_eq!(sel.args["x"], "10");
    assert_eq!(sel.args["y"], "20");
    assert_eq!(sel.args["z"], "30");
    assert_eq!(sel.args["r"], "5");
}

#[test]
fn test_selector_too_many_implicit() {
    let err = parse_selector("@e[1,2,3,4,5]").unwrap_err();
    assert!(matches!(err, UpdateError::MalformedSelector { .. }), "{:?}", err);
}

#[test]
fn test_selector_display_mixes_forms() {
    let sel = parse_selector("@a[10,20,30,type=Zombie]").unwrap().unwrap();
    assert_eq!(sel.to_string(), "@a[x=10,y=20,z=30,type=Zombie]");
}

// ── Compound rewriting ──────────────────────────────────────────────

fn default_updater() -> Updater {
    Updater::new(Options::default())
}

#[test]
fn test_rewrite_id_remap() {
    let (_, tag) = parse_compound("{id:269}", 0).unwrap();
    let (tag, extracted) = default_updater().rewrite_compound(tag, None).unwrap();
    assert_eq!(extracted, None);
    assert_eq!(tag["id"].as_scalar(), Some("\"minecraft:wooden_shovel\""));
}

#[test]
fn test_rewrite_id_suffix_stripped() {
    let (_, tag) = parse_compound("{id:269s}", 0).unwrap();
    let (tag, _) = default_updater().rewrite_compound(tag, None).unwrap();
    assert_eq!(tag["id"].as_scalar(), Some("\"minecraft:wooden_shovel\""));
}

#[test]
fn test_rewrite_unknown_id() {
    let (_, tag) = parse_compound("{id:9999}", 0).unwrap();
    let err = default_updater().rewrite_compound(tag, None).unwrap_err();
    match err {
        UpdateError::UnknownItemId { id } => assert_eq!(id, "9999"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_rewrite_named_id_untouched() {
    let (_, tag) = parse_compound("{id:minecraft:stone}", 0).unwrap();
    let (tag, _) = default_updater().rewrite_compound(tag, None).unwrap();
    assert_eq!(tag["id"].as_scalar(), Some("minecraft:stone"));
}

#[test]
fn test_rewrite_riding_keeps_rider_fields() {
    let (_, tag) = parse_compound("{CustomName:Bob,Riding:{id:Pig,Saddle:1b}}", 0).unwrap();
    let (tag, extracted) = default_updater()
        .rewrite_compound(tag, Some("Zombie"))
        .unwrap();
    assert_eq!(extracted.as_deref(), Some("Pig"));

    let (_, expected) = parse_compound(
        "{Saddle:1b,Passengers:[{CustomName:Bob,id:Zombie}]}",
        0,
    )
    .unwrap();
    assert_eq!(tag, expected);
}

#[test]
fn test_rewrite_riding_overwrites_rider_id() {
    let (_, tag) = parse_compound("{id:Skeleton,Riding:{id:Spider}}", 0).unwrap();
    let (tag, extracted) = default_updater()
        .rewrite_compound(tag, Some("Zombie"))
        .unwrap();
    assert_eq!(extracted.as_deref(), Some("Spider"));

    let passengers = tag["Passengers"].clone();
    let rider = match passengers {
        Value::List(items) => items[0].clone(),
        other => panic!("Passengers is not a list: {:?}", other),
    };
    assert_eq!(rider.as_compound().unwrap()["id"].as_scalar(), Some("Zombie"));
}

#[test]
fn test_rewrite_empty_equipment() {
    let (_, tag) = parse_compound("{Equipment:[]}", 0).unwrap();
    let (tag, _) = default_updater().rewrite_compound(tag, None).unwrap();

    let (_, expected) = parse_compound("{HandItems:[{},{}],ArmorItems:[]}", 0).unwrap();
    assert_eq!(tag, expected);
}

#[test]
fn test_rewrite_empty_drop_chances() {
    let (_, tag) = parse_compound("{DropChances:[]}", 0).unwrap();
    let (tag, _) = default_updater().rewrite_compound(tag, None).unwrap();

    let (_, expected) = parse_compound("{HandDropChances:[],ArmorDropChances:[]}", 0).unwrap();
    assert_eq!(tag, expected);
}

#[test]
fn test_rewrite_healf_overwrites_health() {
    let (_, tag) = parse_compound("{HealF:20,Health:5}", 0).unwrap();
    let (tag, _) = default_updater().rewrite_compound(tag, None).unwrap();
    assert_eq!(tag["Health"].as_scalar(), Some("20"));
    assert!(!tag.contains_key("HealF"));
}

// ── Command formatting ──────────────────────────────────────────────

#[test]
fn test_format_trims_input() {
    let out = default_updater().format_command("  /gamemode 1  ").unwrap();
    assert_eq!(out, "/gamemode 1");
}

#[test]
fn test_format_is_idempotent() {
    let updater = default_updater();
    let once = updater
        .format_command("/summon Zombie ~ ~ ~ {Riding:{id:Pig}}")
        .unwrap();
    let twice = updater.format_command(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_format_malformed_payload_errors() {
    let err = default_updater()
        .format_command("/entitydata @e[type=Pig] {Saddle:{Value:1b}")
        .unwrap_err();
    assert!(matches!(err, UpdateError::UnterminatedCompound { .. }), "{:?}", err);
}

#[test]
fn test_say_mid_word_at_is_not_selector() {
    let updater = Updater::new(Options {
        say_mode: SayMode::Text,
        remap_ids: true,
    });
    let out = updater.format_command("/say mail me@provider now").unwrap();
    assert_eq!(
        out,
        "/tellraw @a [\"\",{\"color\":\"reset\",\"text\":\"mail me@provider now\"}]"
    );
}

#[test]
fn test_say_selector_multiple_arguments() {
    let updater = Updater::new(Options {
        say_mode: SayMode::Text,
        remap_ids: true,
    });
    let out = updater.format_command("/say hi @e[type=Pig,r=5]").unwrap();
    assert_eq!(
        out,
        "/tellraw @a [\"\",{\"color\":\"reset\",\"text\":\"hi \"},{\"color\":\"reset\",\"selector\":\"@e[type=Pig,r=5]\"}]"
    );
}

#[test]
fn test_say_trailing_comma_is_not_selector() {
    let updater = Updater::new(Options {
        say_mode: SayMode::Text,
        remap_ids: true,
    });
    let out = updater.format_command("/say ping @e[type=Pig,] done").unwrap();
    assert_eq!(
        out,
        "/tellraw @a [\"\",{\"color\":\"reset\",\"text\":\"ping @e[type=Pig,] done\"}]"
    );
}

#[test]
fn test_say_selector_with_arguments() {
    let updater = Updater::new(Options {
        say_mode: SayMode::Text,
        remap_ids: true,
    });
    let out = updater.format_command("/say run @e[type=Pig]!").unwrap();
    assert_eq!(
        out,
        "/tellraw @a [\"\",{\"color\":\"reset\",\"text\":\"run \"},{\"color\":\"reset\",\"selector\":\"@e[type=Pig]\"},{\"color\":\"reset\",\"text\":\"!\"}]"
    );
}
