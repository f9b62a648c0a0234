//! Test doubles shared by the integration tests

#![allow(dead_code)]

use indas_mapper::ai_provider::AiProvider;
use indas_mapper::classifier::ModelClient;
use indas_mapper::error::{MapperError, Result};
use indas_mapper_common::Prompt;
use std::cell::RefCell;
use std::collections::VecDeque;

pub const PPE_PATH: &str =
    "Balance Sheet > ASSETS > (1) Non-current assets > (a) Property, Plant and Equipment";

pub const PPE_REPLY: &str = "Classification Type: Balance Sheet\n\
Label Path: Balance Sheet > ASSETS > (1) Non-current assets > (a) Property, Plant and Equipment\n\
Reasoning: Accumulated depreciation is a contra account to PP&E\n\
Ind AS: Ind AS 16";

pub fn reply(classification_type: &str, label_path: &str) -> String {
    format!(
        "Classification Type: {}\nLabel Path: {}\nReasoning: test\nInd AS: Ind AS 1",
        classification_type, label_path
    )
}

/// Model client that replays scripted replies in order.
///
/// `Err` entries become provider failures.
pub struct ScriptedClient {
    replies: RefCell<VecDeque<std::result::Result<String, String>>>,
    pub prompts: RefCell<Vec<Prompt>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }
}

impl ModelClient for ScriptedClient {
    fn provider(&self) -> AiProvider {
        AiProvider::OpenAi
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply left".to_string()))
            .map_err(MapperError::ApiCall)
    }
}
