// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-user command table.

use std::collections::BTreeMap;

use parley_config::model::CommandConfig;
use parley_core::{BotCommand, InboundMessage, OutboundText, ParleyError};
use tracing::{debug, info};

use crate::templates::render;
use crate::{DropReason, Outcome, Relay};

/// Commands published in the platform command menu.
pub fn command_menu(commands: &BTreeMap<String, CommandConfig>) -> Vec<BotCommand> {
    commands
        .iter()
        .filter(|(_, command)| command.register_as_bot_command)
        .map(|(name, command)| BotCommand {
            name: name.clone(),
            description: command.description.clone(),
        })
        .collect()
}

impl Relay {
    /// Publish the command menu. Returns the number of commands registered.
    pub async fn register_commands(&self) -> Result<usize, ParleyError> {
        let menu = command_menu(&self.settings.commands);
        self.gateway.register_commands(&menu).await?;
        info!(count = menu.len(), "command menu published");
        Ok(menu.len())
    }

    /// Answer a private `/command`.
    ///
    /// Unknown commands get the fixed unknown-command text. Known commands
    /// are answered with their configured text, and the feedback chat is
    /// told who ran what.
    pub(crate) async fn user_command(
        &self,
        msg: &InboundMessage,
        name: &str,
    ) -> Result<Outcome, ParleyError> {
        let Some(sender) = msg.from.as_ref() else {
            return Ok(Outcome::Dropped(DropReason::NoSender));
        };
        self.store.ensure_registered(sender).await?;

        let Some(command) = self.settings.commands.get(name) else {
            debug!(user_id = sender.id, command = name, "unknown command");
            self.gateway
                .send_text(OutboundText::plain(
                    msg.chat,
                    self.settings.texts.unknown_command.clone(),
                ))
                .await?;
            return Ok(Outcome::Command {
                name: name.to_string(),
                known: false,
            });
        };

        self.gateway
            .send_text(OutboundText {
                chat: msg.chat,
                text: command.text.clone(),
                reply_to: Some(msg.id),
                formatting: command.formatting,
                disable_preview: command.disable_preview,
            })
            .await?;

        let title = sender.title();
        let notice = render(
            &self.settings.texts.command_notice,
            &[("command", name), ("user", title.as_str())],
        );
        self.gateway
            .send_text(OutboundText::plain(self.settings.feedback_chat, notice))
            .await?;

        Ok(Outcome::Command {
            name: name.to_string(),
            known: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_skips_unregistered_commands() {
        let mut commands = BTreeMap::new();
        commands.insert(
            "start".to_string(),
            CommandConfig {
                text: "hi".into(),
                register_as_bot_command: false,
                ..CommandConfig::default()
            },
        );
        commands.insert(
            "help".to_string(),
            CommandConfig {
                text: "ask away".into(),
                description: "How it works".into(),
                ..CommandConfig::default()
            },
        );

        let menu = command_menu(&commands);
        assert_eq!(
            menu,
            vec![BotCommand {
                name: "help".into(),
                description: "How it works".into(),
            }]
        );
    }
}
