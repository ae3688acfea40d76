use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::error::UpdateError;
use crate::parser::{parse_compound, parse_document};
use crate::pattern::{compile_template, substitute, POS3};
use crate::selector::parse_selector;
use crate::value::{compound_string, json_string};

/// What to do with `/say` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SayMode {
    /// Leave them alone.
    #[default]
    Keep,
    /// Convert to `/tellraw` with plain `text` components.
    Text,
    /// Convert to `/tellraw` with `translate` components, rendering literal
    /// `=` through `%s` placeholders.
    Translate,
}

/// Rewriter configuration, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub say_mode: SayMode,
    /// Replace legacy numeric item ids with namespaced names.
    pub remap_ids: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            say_mode: SayMode::Keep,
            remap_ids: true,
        }
    }
}

/// Capture pre-processing applied before a rule's output is built.
enum PreStep {
    None,
    /// Decode `sel` and `nbt`: rewrite the payload with the selector's
    /// `type` as base entity, then re-encode both.
    Selector,
    /// Decode `nbt`, rewrite it with no base entity, re-encode.
    Structured,
    /// Decode `json` through the document parser, re-encode strictly.
    Json,
}

/// How a matched rule builds its replacement string.
enum Action {
    /// Substitute the processed captures into an output template.
    Template(&'static str),
    /// Substitute raw captures, then feed the result back through
    /// `format_command` (syntactic-sugar forms).
    Redispatch(&'static str),
    /// Keep the execute clause verbatim, rewrite only the inner command.
    Execute,
    /// Rewrite the payload with the summoned entity as base, swapping the
    /// entity token when a mount was extracted.
    Summon,
    /// Convert `/say` text to `/tellraw`.
    Say,
}

struct Rule {
    pattern: Regex,
    pre: PreStep,
    action: Action,
}

/// Ordered rule list under construction. Registration order is match order;
/// the first matching rule wins.
struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    fn new() -> RuleSet {
        RuleSet { rules: Vec::new() }
    }

    fn register(&mut self, pattern: Regex, pre: PreStep, action: Action) {
        self.rules.push(Rule {
            pattern,
            pre,
            action,
        });
    }

    fn template(&mut self, template: &str, pre: PreStep, output: &'static str) {
        self.register(compile_template(template), pre, Action::Template(output));
    }
}

/// Rewrites one command string at a time according to the 1.9 migration
/// rules. Built once; safe to share read-only across callers.
pub struct Updater {
    options: Options,
    rules: Vec<Rule>,
}

impl Updater {
    pub fn new(options: Options) -> Updater {
        let mut set = RuleSet::new();

        set.register(
            Regex::new(&format!(
                r"^(?P<execute>/?execute \S+{} )(?P<cmd>.+)$",
                POS3
            ))
            .unwrap(),
            PreStep::None,
            Action::Execute,
        );

        set.register(
            compile_template("summon {entity} ?{pos} {nbt}"),
            PreStep::None,
            Action::Summon,
        );

        // Selector-bearing commands.
        set.template(
            "scoreboard players (?P<op>set|add|remove) {sel} {obj} {val} {nbt}",
            PreStep::Selector,
            "/scoreboard players {op} {sel} {obj} {val} {nbt}",
        );
        set.template(
            "testfor {sel}(?: {nbt})",
            PreStep::Selector,
            "/testfor {sel} {nbt}",
        );
        set.template(
            "entitydata {sel} {nbt}",
            PreStep::Selector,
            "/entitydata {sel} {nbt}",
        );

        // Convenience forms, resolved by rearranging the arguments and
        // running the result through the rule list again.
        set.register(
            compile_template("summon-at {entity} {nbt}{pos}"),
            PreStep::None,
            Action::Redispatch("/summon {entity}{pos} {nbt}"),
        );
        set.register(
            compile_template("summon-if-at {entity} {nbt} {sel}{pos}"),
            PreStep::None,
            Action::Redispatch("/execute {sel} ~ ~ ~ /summon {entity}{pos} {nbt}"),
        );

        // Json-bearing commands.
        set.template("tellraw {sel} {json}", PreStep::Json, "/tellraw {sel} {json}");
        set.template(
            "title {sel} (?P<kind>title|subtitle) {json}",
            PreStep::Json,
            "/title {sel} {kind} {json}",
        );

        // Plain structured-value commands.
        set.template(
            "give {sel} {item} {amount} {data} {nbt}",
            PreStep::Structured,
            "/give {sel} {item} {amount} {data} {nbt}",
        );
        set.template(
            "setblock{pos} {id} {data} {old} {nbt}",
            PreStep::Structured,
            "/setblock{pos} {id} {data} {old} {nbt}",
        );
        set.template(
            "fill{pos1}{pos2} {id} {data} {old} {nbt}",
            PreStep::Structured,
            "/fill{pos1}{pos2} {id} {data} {old} {nbt}",
        );
        set.template(
            "blockdata{pos} {nbt}",
            PreStep::Structured,
            "/blockdata{pos} {nbt}",
        );
        set.register(
            compile_template(&format!(
                r"replaceitem (?P<where>block(?:{})|entity \S+) {{slot}} {{item}} {{amount}} {{data}} {{nbt}}",
                POS3
            )),
            PreStep::Structured,
            Action::Template("/replaceitem {where} {slot} {item} {amount} {data} {nbt}"),
        );
        set.template(
            "clear {sel} {item} {data} {max} {nbt}",
            PreStep::Structured,
            "/clear {sel} {item} {data} {max} {nbt}",
        );
        set.template(
            "testforblock{pos} {id} {data} {nbt}",
            PreStep::Structured,
            "/testforblock{pos} {id} {data} {nbt}",
        );

        if options.say_mode != SayMode::Keep {
            set.register(compile_template("say {line}"), PreStep::None, Action::Say);
        }

        Updater {
            options,
            rules: set.rules,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Rewrite one command. Rules are tried in registration order and the
    /// first match wins; a command matching no rule comes back unchanged
    /// (after trimming). An error means a matched rule hit genuinely
    /// malformed payload data.
    pub fn format_command(&self, command: &str) -> Result<String, UpdateError> {
        let command = command.trim();
        for rule in &self.rules {
            if let Some(caps) = rule.pattern.captures(command) {
                return self.apply(rule, &caps);
            }
        }
        Ok(command.to_string())
    }

    fn apply(&self, rule: &Rule, caps: &Captures<'_>) -> Result<String, UpdateError> {
        let mut values: BTreeMap<String, String> = rule
            .pattern
            .capture_names()
            .flatten()
            .map(|name| {
                let text = caps.name(name).map_or("", |m| m.as_str());
                (name.to_string(), text.to_string())
            })
            .collect();

        match rule.pre {
            PreStep::None => {}
            PreStep::Structured => {
                let (_, map) = parse_compound(cap(&values, "nbt"), 0)?;
                let map = self.rewrite_nested(map, true)?;
                values.insert("nbt".to_string(), compound_string(&map));
            }
            PreStep::Selector => {
                let (_, map) = parse_compound(cap(&values, "nbt"), 0)?;
                match parse_selector(cap(&values, "sel"))? {
                    Some(mut sel) => {
                        let base = sel.entity_type().map(str::to_string);
                        let (map, new_type) = self.rewrite_compound(map, base.as_deref())?;
                        match new_type.or(base) {
                            Some(entity_type) => {
                                sel.args.insert("type".to_string(), entity_type);
                            }
                            None => {
                                sel.args.shift_remove("type");
                            }
                        }
                        values.insert("sel".to_string(), sel.to_string());
                        values.insert("nbt".to_string(), compound_string(&map));
                    }
                    // Not a selector: rewrite the payload on its own.
                    None => {
                        let map = self.rewrite_nested(map, true)?;
                        values.insert("nbt".to_string(), compound_string(&map));
                    }
                }
            }
            PreStep::Json => {
                let doc = parse_document(cap(&values, "json"))?;
                values.insert("json".to_string(), json_string(&doc));
            }
        }

        match &rule.action {
            Action::Template(output) => Ok(substitute(output, &values)),
            Action::Redispatch(output) => self.format_command(&substitute(output, &values)),
            Action::Execute => Ok(format!(
                "{}{}",
                cap(&values, "execute"),
                self.format_command(cap(&values, "cmd"))?
            )),
            Action::Summon => {
                let (_, map) = parse_compound(cap(&values, "nbt"), 0)?;
                let entity = cap(&values, "entity");
                let (map, extracted) = self.rewrite_compound(map, Some(entity))?;
                Ok(format!(
                    "/summon {}{} {}",
                    extracted.as_deref().unwrap_or(entity),
                    cap(&values, "pos"),
                    compound_string(&map)
                ))
            }
            Action::Say => Ok(self.say_to_tellraw(cap(&values, "line"))),
        }
    }
}

fn cap<'a>(values: &'a BTreeMap<String, String>, name: &str) -> &'a str {
    values.get(name).map_or("", String::as_str)
}
