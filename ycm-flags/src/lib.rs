// SPDX-License-Identifier: GPL-3.0-or-later

pub mod args;
pub mod config;
pub mod context;
pub mod database;
pub mod environment;
pub mod flags;
pub mod modes;
pub mod ninja;
pub mod path;
pub mod resolver;
pub mod root;
