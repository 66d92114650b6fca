//! Query source for TREC microblog topic files.
//!
//! The files are a sequence of `<top>` records without an enclosing root:
//!
//! ```text
//! <top>
//! <num> Number: MB001 </num>
//! <title> BBC World Service staff cuts </title>
//! <querytime> Tue Feb 08 12:30:27 +0000 2011 </querytime>
//! <querytweettime> 34952194402811904 </querytweettime>
//! </top>
//! ```
//!
//! A record is only kept when all four fields are present.

use crate::error::{Error, Result};
use crate::Query;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub query_time: String,
    pub query_tweet_time: String,
}

impl Topic {
    pub fn to_query(&self) -> Query { Query::new(self.id.clone(), self.title.clone()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Num,
    Title,
    QueryTime,
    QueryTweetTime,
}

impl Field {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "num" => Some(Field::Num),
            "title" => Some(Field::Title),
            "querytime" => Some(Field::QueryTime),
            "querytweettime" => Some(Field::QueryTweetTime),
            _ => None,
        }
    }

    fn clean(self, raw: &str) -> String {
        let value = raw.trim();
        match self {
            Field::Num => value.strip_prefix("Number:").unwrap_or(value).trim().to_string(),
            _ => value.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct PartialTopic {
    num: Option<String>,
    title: Option<String>,
    query_time: Option<String>,
    query_tweet_time: Option<String>,
}

impl PartialTopic {
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Num => &mut self.num,
            Field::Title => &mut self.title,
            Field::QueryTime => &mut self.query_time,
            Field::QueryTweetTime => &mut self.query_tweet_time,
        };
        *slot = Some(value);
    }

    fn complete(self) -> Option<Topic> {
        Some(Topic {
            id: self.num?,
            title: self.title?,
            query_time: self.query_time?,
            query_tweet_time: self.query_tweet_time?,
        })
    }
}

fn tag_name(name: &[u8]) -> String { String::from_utf8_lossy(name).to_ascii_lowercase() }

/// Parse topics in file order. A repeated topic id keeps its first position and takes the later title.
pub fn parse_topics<R: BufRead>(input: R, resource: &str) -> Result<Vec<Topic>> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();

    let mut topics: Vec<Topic> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut current: Option<PartialTopic> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut dropped = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = tag_name(e.local_name().as_ref());
                if name == "top" {
                    current = Some(PartialTopic::default());
                } else if let Some(f) = Field::from_tag(&name) {
                    field = Some(f);
                    text.clear();
                }
            }
            Ok(Event::Text(t)) if field.is_some() => match t.unescape() {
                Ok(s) => text.push_str(&s),
                Err(_) => text.push_str(&String::from_utf8_lossy(&t)),
            },
            Ok(Event::CData(t)) if field.is_some() => text.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::End(e)) => {
                let name = tag_name(e.local_name().as_ref());
                if name == "top" {
                    match current.take().and_then(PartialTopic::complete) {
                        Some(topic) => match positions.get(&topic.id) {
                            Some(&i) => topics[i] = topic,
                            None => {
                                positions.insert(topic.id.clone(), topics.len());
                                topics.push(topic);
                            }
                        },
                        None => dropped += 1,
                    }
                } else if let Some(f) = Field::from_tag(&name).filter(|f| field == Some(*f)) {
                    if let Some(partial) = current.as_mut() {
                        partial.set(f, f.clean(&text));
                    }
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::TopicsFormat {
                    resource: resource.to_string(),
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    if dropped > 0 {
        tracing::warn!(resource, dropped, "dropped incomplete topics");
    }
    tracing::info!(resource, topics = topics.len(), "parsed topics");
    Ok(topics)
}

pub fn read_topics(path: &Path) -> Result<Vec<Topic>> {
    let f = File::open(path).map_err(|e| Error::io("open topics", path, e))?;
    parse_topics(BufReader::new(f), &path.display().to_string())
}
