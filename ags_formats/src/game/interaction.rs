//! Interaction tables: named script functions per event in newer games,
//! command trees evaluated by the runtime in 2.x games.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::reader::Cursor;
use crate::writer::Writer;

pub const MAX_INTERACTION_EVENTS: usize = 30;
pub const COMMAND_ARGS: usize = 5;
const COMMAND_SIZE: usize = 76;
const EVENT_FUNCTION_MAX_LEN: usize = 200;
const MAX_TREE_DEPTH: usize = 32;
const VARIABLE_NAME_LEN: usize = 23;
const VARIABLE_SIZE: usize = 28;

/// Script function names bound to each event of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionScripts {
    pub functions: Vec<String>,
}

impl InteractionScripts {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let count = cursor.read_count()?;
        if count > MAX_INTERACTION_EVENTS {
            return Err(Error::InvalidCount {
                section: cursor.section(),
                count: count as i64,
            });
        }
        let functions = (0..count)
            .map(|_| cursor.read_c_string(EVENT_FUNCTION_MAX_LEN))
            .collect::<Result<_>>()?;
        Ok(Self { functions })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.i32(self.functions.len() as i32);
        for function in &self.functions {
            out.c_str(function);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommandArg {
    pub kind: u8,
    pub value: i32,
    pub extra: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionCommand {
    pub command: i32,
    pub args: [CommandArg; COMMAND_ARGS],
    pub children: Option<CommandList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandList {
    pub times_run: i32,
    pub commands: Vec<InteractionCommand>,
}

impl CommandList {
    fn read(cursor: &mut Cursor<'_>, depth: usize) -> Result<Self> {
        if depth > MAX_TREE_DEPTH {
            return Err(Error::corrupt(
                cursor.section(),
                format!("command tree nested deeper than {MAX_TREE_DEPTH}"),
            ));
        }
        let count = cursor.read_count()?;
        let times_run = cursor.read_i32()?;
        cursor.expect_records(count, COMMAND_SIZE)?;

        let mut commands = Vec::with_capacity(count);
        let mut has_children = Vec::with_capacity(count);
        for _ in 0..count {
            let _vtable = cursor.read_i32()?;
            let command = cursor.read_i32()?;
            let mut args = [CommandArg::default(); COMMAND_ARGS];
            for arg in &mut args {
                arg.kind = cursor.read_u8()?;
                cursor.skip(3)?;
                arg.value = cursor.read_i32()?;
                arg.extra = cursor.read_i32()?;
            }
            has_children.push(cursor.read_i32()? != 0);
            let _parent = cursor.read_i32()?;
            commands.push(InteractionCommand {
                command,
                args,
                children: None,
            });
        }

        for (command, nested) in commands.iter_mut().zip(has_children) {
            if nested {
                command.children = Some(CommandList::read(cursor, depth + 1)?);
            }
        }
        Ok(Self {
            times_run,
            commands,
        })
    }

    fn write(&self, out: &mut Writer) {
        out.i32(self.commands.len() as i32).i32(self.times_run);
        for command in &self.commands {
            out.i32(0).i32(command.command);
            for arg in &command.args {
                out.u8(arg.kind).zeros(3).i32(arg.value).i32(arg.extra);
            }
            out.i32(command.children.is_some() as i32).i32(0);
        }
        for command in &self.commands {
            if let Some(children) = &command.children {
                children.write(out);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionEvent {
    pub event: i32,
    pub times_run: i32,
    pub response: Option<CommandList>,
}

/// Legacy interaction tree of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub events: Vec<InteractionEvent>,
}

impl Interaction {
    /// Returns `None` when the stored presence word says the entity has no
    /// interaction block.
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Option<Self>> {
        if cursor.read_i32()? != 1 {
            return Ok(None);
        }
        let count = cursor.read_count()?;
        if count > MAX_INTERACTION_EVENTS {
            return Err(Error::InvalidCount {
                section: cursor.section(),
                count: count as i64,
            });
        }
        let kinds = cursor.read_i32_vec(count)?;
        let times_run = cursor.read_i32_vec(count)?;
        let responses = cursor.read_i32_vec(count)?;

        let mut events = Vec::with_capacity(count);
        for index in 0..count {
            let response = if responses[index] != 0 {
                Some(CommandList::read(cursor, 0)?)
            } else {
                None
            };
            events.push(InteractionEvent {
                event: kinds[index],
                times_run: times_run[index],
                response,
            });
        }
        Ok(Some(Self { events }))
    }

    pub(crate) fn write(interaction: Option<&Self>, out: &mut Writer) {
        let Some(interaction) = interaction else {
            out.i32(0);
            return;
        };
        out.i32(1).i32(interaction.events.len() as i32);
        for event in &interaction.events {
            out.i32(event.event);
        }
        for event in &interaction.events {
            out.i32(event.times_run);
        }
        for event in &interaction.events {
            out.i32(event.response.is_some() as i32);
        }
        for event in &interaction.events {
            if let Some(response) = &event.response {
                response.write(out);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionVariable {
    pub name: String,
    pub kind: u8,
    pub value: i32,
}

impl InteractionVariable {
    pub(crate) fn read_all(cursor: &mut Cursor<'_>) -> Result<Vec<Self>> {
        let count = cursor.read_count()?;
        cursor.expect_records(count, VARIABLE_SIZE)?;
        (0..count)
            .map(|_| {
                Ok(Self {
                    name: cursor.read_fixed_string(VARIABLE_NAME_LEN)?,
                    kind: cursor.read_u8()?,
                    value: cursor.read_i32()?,
                })
            })
            .collect()
    }

    pub(crate) fn write_all(variables: &[Self], out: &mut Writer) {
        out.i32(variables.len() as i32);
        for variable in variables {
            out.fixed_str(&variable.name, VARIABLE_NAME_LEN)
                .u8(variable.kind)
                .i32(variable.value);
        }
    }
}

/// Interaction data of the whole game in whichever form the version stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interactions {
    Scripts {
        characters: Vec<InteractionScripts>,
        /// Indexed like the inventory table; item 0 never has handlers.
        inventory: Vec<InteractionScripts>,
    },
    Legacy {
        characters: Vec<Option<Interaction>>,
        inventory: Vec<Option<Interaction>>,
        variables: Vec<InteractionVariable>,
    },
}

impl Default for Interactions {
    fn default() -> Self {
        Interactions::Scripts {
            characters: Vec::new(),
            inventory: Vec::new(),
        }
    }
}

impl Interactions {
    pub(crate) fn read_scripts(
        cursor: &mut Cursor<'_>,
        characters: usize,
        inventory_items: usize,
    ) -> Result<Self> {
        cursor.enter("character interactions");
        let characters = (0..characters)
            .map(|_| InteractionScripts::read(cursor))
            .collect::<Result<_>>()?;
        cursor.enter("inventory interactions");
        let mut inventory = vec![InteractionScripts::default()];
        for _ in 1..inventory_items {
            inventory.push(InteractionScripts::read(cursor)?);
        }
        inventory.truncate(inventory_items);
        Ok(Interactions::Scripts {
            characters,
            inventory,
        })
    }

    pub(crate) fn read_legacy(
        cursor: &mut Cursor<'_>,
        characters: usize,
        inventory_items: usize,
    ) -> Result<Self> {
        cursor.enter("character interactions");
        let characters = (0..characters)
            .map(|_| Interaction::read(cursor))
            .collect::<Result<_>>()?;
        cursor.enter("inventory interactions");
        let inventory = (0..inventory_items)
            .map(|_| Interaction::read(cursor))
            .collect::<Result<_>>()?;
        cursor.enter("interaction variables");
        let variables = InteractionVariable::read_all(cursor)?;
        Ok(Interactions::Legacy {
            characters,
            inventory,
            variables,
        })
    }

    /// Write in the encoding selected by `legacy`, padding or cutting the
    /// tables to the declared entity counts.
    pub(crate) fn write(
        &self,
        out: &mut Writer,
        legacy: bool,
        characters: usize,
        inventory_items: usize,
    ) {
        match (self, legacy) {
            (
                Interactions::Scripts {
                    characters: char_scripts,
                    inventory,
                },
                false,
            ) => {
                let blank = InteractionScripts::default();
                for index in 0..characters {
                    char_scripts.get(index).unwrap_or(&blank).write(out);
                }
                for index in 1..inventory_items {
                    inventory.get(index).unwrap_or(&blank).write(out);
                }
            }
            (
                Interactions::Legacy {
                    characters: char_trees,
                    inventory,
                    variables,
                },
                true,
            ) => {
                for index in 0..characters {
                    Interaction::write(char_trees.get(index).and_then(Option::as_ref), out);
                }
                for index in 0..inventory_items {
                    Interaction::write(inventory.get(index).and_then(Option::as_ref), out);
                }
                InteractionVariable::write_all(variables, out);
            }
            (_, false) => Interactions::default().write(out, false, characters, inventory_items),
            (_, true) => Interactions::Legacy {
                characters: Vec::new(),
                inventory: Vec::new(),
                variables: Vec::new(),
            }
            .write(out, true, characters, inventory_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_tree() -> Interaction {
        let leaf = InteractionCommand {
            command: 4,
            ..InteractionCommand::default()
        };
        let mut branch = InteractionCommand {
            command: 20,
            children: Some(CommandList {
                times_run: 0,
                commands: vec![leaf],
            }),
            ..InteractionCommand::default()
        };
        branch.args[0] = CommandArg {
            kind: 1,
            value: 5,
            extra: 0,
        };
        Interaction {
            events: vec![
                InteractionEvent {
                    event: 0,
                    times_run: 2,
                    response: Some(CommandList {
                        times_run: 1,
                        commands: vec![branch],
                    }),
                },
                InteractionEvent::default(),
            ],
        }
    }

    #[test]
    fn legacy_trees_keep_nested_commands() {
        let tree = nested_tree();
        let mut out = Writer::new();
        Interaction::write(Some(&tree), &mut out);
        Interaction::write(None, &mut out);

        let mut cursor = Cursor::new(out.as_slice());
        let decoded = Interaction::read(&mut cursor).unwrap().unwrap();
        assert_eq!(decoded, tree);
        assert!(Interaction::read(&mut cursor).unwrap().is_none());
        assert!(cursor.is_empty());
    }

    #[test]
    fn inventory_scripts_skip_the_placeholder_item() {
        let mut out = Writer::new();
        // one character, inventory items 1 and 2
        InteractionScripts {
            functions: vec!["player_Look".into()],
        }
        .write(&mut out);
        InteractionScripts {
            functions: vec![String::new(), "iKey_Interact".into()],
        }
        .write(&mut out);
        InteractionScripts::default().write(&mut out);

        let mut cursor = Cursor::new(out.as_slice());
        let Interactions::Scripts {
            characters,
            inventory,
        } = Interactions::read_scripts(&mut cursor, 1, 3).unwrap()
        else {
            panic!("expected script interactions");
        };
        assert_eq!(characters[0].functions, vec!["player_Look"]);
        assert_eq!(inventory.len(), 3);
        assert!(inventory[0].functions.is_empty());
        assert_eq!(inventory[1].functions[1], "iKey_Interact");
    }

    #[test]
    fn too_many_events_is_rejected() {
        let mut out = Writer::new();
        out.i32(31);
        let mut cursor = Cursor::new(out.as_slice());
        cursor.enter("character interactions");
        let err = InteractionScripts::read(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::InvalidCount { count: 31, .. }));
    }
}
