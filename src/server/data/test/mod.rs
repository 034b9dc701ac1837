mod custom_command;
mod giveaway;
mod guild_config;
mod modmail;
mod operator;
mod reaction_role;
mod ticket;
mod warning;
