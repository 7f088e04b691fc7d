//! Command Parsing
//!
//! Turns one line of text (`VERB key [args...]`) into a typed `Command` and
//! runs it against the store.

use std::time::Duration;

use crate::error::{Result, StoreError};
use crate::store::{SetCondition, Store};

// == Command ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set {
        key: String,
        value: String,
        ttl: Option<Duration>,
        condition: SetCondition,
    },
    Get {
        key: String,
    },
    QueuePush {
        key: String,
        values: Vec<String>,
    },
    QueuePop {
        key: String,
    },
    BlockingQueuePop {
        key: String,
        timeout: Duration,
    },
}

/// Result of running a command, before it is mapped to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// SET wrote the value
    Stored(String),
    /// SET was skipped because its NX/XX condition failed
    ConditionNotMet,
    /// QPUSH appended or handed off its values
    Pushed,
    /// GET or QPOP result
    Value(String),
    /// BQPOP result; None on timeout
    MaybeValue(Option<String>),
}

fn invalid(message: &str) -> StoreError {
    StoreError::InvalidRequest(message.to_string())
}

fn parse_seconds(raw: &str) -> Result<u64> {
    raw.parse().map_err(|_| invalid("invalid time"))
}

impl Command {
    /// Parses a whitespace separated command. The verb is case-insensitive.
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or_else(|| invalid("empty command"))?;
        let args: Vec<&str> = parts.collect();

        match verb.to_ascii_uppercase().as_str() {
            "SET" => Self::parse_set(&args),
            "GET" => match args.as_slice() {
                [key] => Ok(Command::Get { key: key.to_string() }),
                _ => Err(invalid("invalid number of arguments for get")),
            },
            "QPUSH" => match args.as_slice() {
                [key, values @ ..] if !values.is_empty() => Ok(Command::QueuePush {
                    key: key.to_string(),
                    values: values.iter().map(|v| v.to_string()).collect(),
                }),
                _ => Err(invalid("invalid number of arguments for qpush")),
            },
            "QPOP" => match args.as_slice() {
                [key] => Ok(Command::QueuePop { key: key.to_string() }),
                _ => Err(invalid("invalid number of arguments for qpop")),
            },
            "BQPOP" => match args.as_slice() {
                [key, secs] => Ok(Command::BlockingQueuePop {
                    key: key.to_string(),
                    timeout: Duration::from_secs(
                        secs.parse().map_err(|_| invalid("invalid timeout request"))?,
                    ),
                }),
                _ => Err(invalid("invalid number of arguments for bqpop")),
            },
            _ => Err(invalid("invalid command")),
        }
    }

    // SET key value [EX seconds] [NX|XX]
    fn parse_set(args: &[&str]) -> Result<Self> {
        let (key, value, ttl, condition) = match args {
            [key, value] => (key, value, None, ""),
            [key, value, condition] => (key, value, None, *condition),
            [key, value, flag, secs] | [key, value, flag, secs, _] => {
                if !flag.eq_ignore_ascii_case("EX") {
                    return Err(invalid("invalid command"));
                }
                let condition = args.get(4).copied().unwrap_or("");
                (key, value, Some(Duration::from_secs(parse_seconds(secs)?)), condition)
            }
            _ => return Err(invalid("invalid number of arguments for set")),
        };

        Ok(Command::Set {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
            condition: condition.parse()?,
        })
    }

    /// Whether this command mutates the keyspace from the caller's view.
    pub fn is_write(&self) -> bool {
        matches!(self, Command::Set { .. } | Command::QueuePush { .. })
    }

    /// Runs the command against `store`.
    pub async fn execute(self, store: &Store) -> Result<Outcome> {
        match self {
            Command::Set { key, value, ttl, condition } => {
                if store.set(&key, value, ttl, condition).await {
                    Ok(Outcome::Stored(key))
                } else {
                    Ok(Outcome::ConditionNotMet)
                }
            }
            Command::Get { key } => store.get(&key).await.map(Outcome::Value),
            Command::QueuePush { key, values } => {
                store.queue_push(&key, values).await.map(|()| Outcome::Pushed)
            }
            Command::QueuePop { key } => store.queue_pop(&key).await.map(Outcome::Value),
            Command::BlockingQueuePop { key, timeout } => store
                .blocking_queue_pop(&key, timeout)
                .await
                .map(Outcome::MaybeValue),
        }
    }
}
