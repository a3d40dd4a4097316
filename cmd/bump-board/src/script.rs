//! JSON-lines command surface over a [`Registry`].
//!
//! Each input line is one [`Command`]; each produces one [`Outcome`].
//! Accounts are plain labels mapped to stable addresses. Boards and threads
//! get an alias when they are created, and an alias can also be used as a
//! caller (that is how a script makes a thread call its board directly).

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use domains::{Address, Clock, InternalId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use services::Registry;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    DeployBoard {
        caller: String,
        #[serde(rename = "as")]
        alias: String,
    },
    DeployThread {
        caller: String,
        title: String,
        text: String,
        #[serde(rename = "as")]
        alias: String,
    },
    CreateThread {
        caller: String,
        board: String,
        title: String,
        text: String,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    RegisterThread {
        caller: String,
        board: String,
        thread: String,
    },
    BumpThread {
        caller: String,
        board: String,
    },
    Post {
        caller: String,
        thread: String,
        text: String,
    },
    RemovePost {
        caller: String,
        thread: String,
        index: usize,
    },
    DetachThreadByIndex {
        caller: String,
        board: String,
        index: usize,
    },
    DetachThreadByInternalId {
        caller: String,
        board: String,
        id: u64,
    },
    Lock {
        caller: String,
        board: String,
    },
    Unlock {
        caller: String,
        board: String,
    },
    DestructBoard {
        caller: String,
        board: String,
    },
    DestructThread {
        caller: String,
        thread: String,
    },
    ThreadAt {
        board: String,
        index: usize,
    },
    FirstThread {
        board: String,
    },
    LastThread {
        board: String,
    },
    ThreadArray {
        board: String,
        start: usize,
        count: usize,
    },
    NumberOfThreads {
        board: String,
    },
    InternalIdOfIndex {
        board: String,
        index: usize,
    },
    IsLocked {
        board: String,
    },
    IsAlive {
        board: String,
    },
    Title {
        thread: String,
    },
    PostAt {
        thread: String,
        index: usize,
    },
    PostTextArray {
        thread: String,
        start: usize,
        count: usize,
    },
    NumberOfPosts {
        thread: String,
    },
    ParentBoard {
        thread: String,
    },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Outcome {
    pub line: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct Session<C> {
    registry: Registry<C>,
    aliases: HashMap<String, Address>,
    max_page: usize,
}

impl<C: Clock> Session<C> {
    pub fn new(registry: Registry<C>, max_page: usize) -> Self {
        Self {
            registry,
            aliases: HashMap::new(),
            max_page,
        }
    }

    pub fn run_line(&mut self, line: usize, input: &str) -> Outcome {
        let result = serde_json::from_str::<Command>(input)
            .map_err(|e| anyhow!("invalid command: {e}"))
            .and_then(|command| self.apply(command));
        match result {
            Ok(value) => Outcome {
                line,
                ok: true,
                value: Some(value),
                error: None,
            },
            Err(err) => {
                debug!(line, error = %err, "command rejected");
                Outcome {
                    line,
                    ok: false,
                    value: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Callers may be aliases (boards, threads) or free-form account labels.
    fn caller(&self, label: &str) -> Address {
        self.aliases
            .get(label)
            .copied()
            .unwrap_or_else(|| Address::from_label(label))
    }

    fn target(&self, alias: &str) -> Result<Address> {
        self.aliases
            .get(alias)
            .copied()
            .ok_or_else(|| anyhow!("unknown alias `{alias}`"))
    }

    fn bind(&mut self, alias: String, address: Address) -> Result<()> {
        if self.aliases.contains_key(&alias) {
            return Err(anyhow!("alias `{alias}` is already bound"));
        }
        self.aliases.insert(alias, address);
        Ok(())
    }

    /// Alias of `address` when it has one, the raw address otherwise.
    fn name_of(&self, address: Address) -> Value {
        if address.is_zero() {
            return Value::Null;
        }
        self.aliases
            .iter()
            .find(|(_, bound)| **bound == address)
            .map(|(alias, _)| Value::String(alias.clone()))
            .unwrap_or_else(|| Value::String(address.to_string()))
    }

    fn apply(&mut self, command: Command) -> Result<Value> {
        let value = match command {
            Command::DeployBoard { caller, alias } => {
                let board = self.registry.deploy_board(self.caller(&caller));
                self.bind(alias, board)?;
                json!(board)
            }
            Command::DeployThread {
                caller,
                title,
                text,
                alias,
            } => {
                let thread = self
                    .registry
                    .deploy_thread(self.caller(&caller), &title, &text)?;
                self.bind(alias, thread)?;
                json!(thread)
            }
            Command::CreateThread {
                caller,
                board,
                title,
                text,
                alias,
            } => {
                let board = self.target(&board)?;
                let thread = self
                    .registry
                    .create_thread(self.caller(&caller), board, &title, &text)?;
                if let Some(alias) = alias {
                    self.bind(alias, thread)?;
                }
                json!(thread)
            }
            Command::RegisterThread {
                caller,
                board,
                thread,
            } => {
                let id = self.registry.register_thread(
                    self.caller(&caller),
                    self.target(&board)?,
                    self.target(&thread)?,
                )?;
                json!(id)
            }
            Command::BumpThread { caller, board } => {
                self.registry
                    .bump_thread(self.caller(&caller), self.target(&board)?)?;
                Value::Null
            }
            Command::Post {
                caller,
                thread,
                text,
            } => {
                let index = self
                    .registry
                    .post(self.caller(&caller), self.target(&thread)?, &text)?;
                json!(index)
            }
            Command::RemovePost {
                caller,
                thread,
                index,
            } => {
                self.registry
                    .remove_post(self.caller(&caller), self.target(&thread)?, index)?;
                Value::Null
            }
            Command::DetachThreadByIndex {
                caller,
                board,
                index,
            } => {
                let thread = self.registry.detach_thread_by_index(
                    self.caller(&caller),
                    self.target(&board)?,
                    index,
                )?;
                self.name_of(thread)
            }
            Command::DetachThreadByInternalId { caller, board, id } => {
                let thread = self.registry.detach_thread_by_internal_id(
                    self.caller(&caller),
                    self.target(&board)?,
                    InternalId(id),
                )?;
                self.name_of(thread)
            }
            Command::Lock { caller, board } => {
                self.registry.lock(self.caller(&caller), self.target(&board)?)?;
                Value::Null
            }
            Command::Unlock { caller, board } => {
                self.registry
                    .unlock(self.caller(&caller), self.target(&board)?)?;
                Value::Null
            }
            Command::DestructBoard { caller, board } => {
                self.registry
                    .destruct_board(self.caller(&caller), self.target(&board)?)?;
                Value::Null
            }
            Command::DestructThread { caller, thread } => {
                self.registry
                    .destruct_thread(self.caller(&caller), self.target(&thread)?)?;
                Value::Null
            }
            Command::ThreadAt { board, index } => {
                let thread = self.registry.thread_at(self.target(&board)?, index)?;
                self.name_of(thread)
            }
            Command::FirstThread { board } => {
                let thread = self.registry.board(self.target(&board)?)?.first_thread()?;
                self.name_of(thread)
            }
            Command::LastThread { board } => {
                let thread = self.registry.board(self.target(&board)?)?.last_thread()?;
                self.name_of(thread)
            }
            Command::ThreadArray {
                board,
                start,
                count,
            } => {
                let page = self.registry.thread_array(
                    self.target(&board)?,
                    start,
                    count.min(self.max_page),
                )?;
                let items: Vec<Value> = page.items.iter().map(|a| self.name_of(*a)).collect();
                json!({ "items": items, "count": page.count })
            }
            Command::NumberOfThreads { board } => {
                json!(self.registry.board(self.target(&board)?)?.number_of_threads())
            }
            Command::InternalIdOfIndex { board, index } => {
                json!(self
                    .registry
                    .board(self.target(&board)?)?
                    .internal_id_of_index(index)?)
            }
            Command::IsLocked { board } => {
                json!(self.registry.board(self.target(&board)?)?.is_locked())
            }
            Command::IsAlive { board } => {
                json!(self.registry.board(self.target(&board)?)?.is_alive())
            }
            Command::Title { thread } => {
                json!(self.registry.thread(self.target(&thread)?)?.title())
            }
            Command::PostAt { thread, index } => {
                json!(self.registry.post_at(self.target(&thread)?, index)?)
            }
            Command::PostTextArray {
                thread,
                start,
                count,
            } => {
                json!(self
                    .registry
                    .thread(self.target(&thread)?)?
                    .post_text_array(start, count.min(self.max_page))?)
            }
            Command::NumberOfPosts { thread } => {
                json!(self.registry.thread(self.target(&thread)?)?.number_of_posts())
            }
            Command::ParentBoard { thread } => {
                let board = self.registry.thread(self.target(&thread)?)?.parent_board();
                self.name_of(board)
            }
        };
        Ok(value)
    }
}
