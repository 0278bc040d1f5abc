//! Action 注册表
//!
//! 动作是插件对外暴露的能力单元：校验消息、提取意图、调用钱包服务并回复用户

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::runtime::{AgentRuntime, HandlerCallback, Memory, State};
use crate::errors::{PluginError, Result};

/// 动作执行结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub response: String,
}

impl ActionResult {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: response.into(),
        }
    }

    pub fn failure(response: impl Into<String>) -> Self {
        Self {
            success: false,
            response: response.into(),
        }
    }
}

/// 示例对话中的一句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionExample {
    pub user: String,
    pub text: String,
}

impl ActionExample {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            user: "user".to_string(),
            text: text.into(),
        }
    }
}

/// 动作接口
#[async_trait]
pub trait Action: Send + Sync {
    /// 唯一名称，如 `OKTO_TRANSFER`
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 别名
    fn similes(&self) -> &[&'static str] {
        &[]
    }

    /// 用于自由文本路由的关键词（小写）
    fn keywords(&self) -> &[&'static str] {
        &[]
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        Vec::new()
    }

    /// 是否抑制宿主在动作执行前发送的初始回复
    fn suppress_initial_message(&self) -> bool {
        false
    }

    /// 判断消息是否可由该动作处理
    async fn validate(
        &self,
        runtime: &dyn AgentRuntime,
        message: &Memory,
        state: Option<&State>,
    ) -> bool;

    /// 处理消息
    async fn handle(
        &self,
        runtime: &dyn AgentRuntime,
        message: &Memory,
        state: Option<State>,
        callback: Option<&HandlerCallback>,
    ) -> ActionResult;
}

/// 已注册的动作
struct Registered {
    /// 注册序号，用于保持列出顺序
    seq: usize,
    action: Arc<dyn Action>,
    /// 按词边界匹配的关键词及其长度
    keywords: Vec<(Regex, usize)>,
}

/// 路由得分：先比命中数，再比命中关键词的总长度（越长越具体）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RouteScore {
    hits: usize,
    specificity: usize,
}

/// 动作注册表，支持按名称、别名和关键词查找
pub struct ActionRegistry {
    actions: DashMap<String, Registered>,
    aliases: DashMap<String, String>,
    next_seq: AtomicUsize,
}

impl ActionRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            actions: DashMap::new(),
            aliases: DashMap::new(),
            next_seq: AtomicUsize::new(0),
        }
    }

    /// 注册动作
    pub fn register(&self, action: Arc<dyn Action>) -> Result<()> {
        let name = action.name().to_uppercase();
        let keywords = action
            .keywords()
            .iter()
            .map(|kw| {
                let kw = kw.trim().to_lowercase();
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&kw)))
                    .map(|re| (re, kw.len()))
                    .map_err(|e| PluginError::Config(format!("invalid keyword '{}': {}", kw, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        match self.actions.entry(name.clone()) {
            Entry::Occupied(_) => {
                return Err(PluginError::Config(format!("Action already registered: {}", name)));
            }
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                slot.insert(Registered {
                    seq,
                    action: Arc::clone(&action),
                    keywords,
                });
            }
        }

        for simile in action.similes() {
            let simile = simile.to_uppercase();
            if simile != name {
                self.aliases.entry(simile).or_insert_with(|| name.clone());
            }
        }

        debug!("Registered action: {}", name);
        Ok(())
    }

    /// 按名称或别名查找（不区分大小写）
    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        let key = name.trim().to_uppercase();
        if let Some(entry) = self.actions.get(&key) {
            return Some(Arc::clone(&entry.action));
        }
        let target = self.aliases.get(&key)?.clone();
        self.actions.get(&target).map(|entry| Arc::clone(&entry.action))
    }

    /// 检查动作是否存在
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 按注册顺序列出动作名
    pub fn names(&self) -> Vec<String> {
        self.list_all().iter().map(|a| a.name().to_uppercase()).collect()
    }

    /// 按注册顺序列出所有动作
    pub fn list_all(&self) -> Vec<Arc<dyn Action>> {
        let mut entries: Vec<(usize, Arc<dyn Action>)> = self
            .actions
            .iter()
            .map(|entry| (entry.seq, Arc::clone(&entry.action)))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, action)| action).collect()
    }

    /// 为自由文本挑选动作
    ///
    /// 关键词按词边界匹配。命中数多者优先，命中数相同时取命中关键词更长者，
    /// 仍相同时取先注册者
    pub fn route(&self, text: &str) -> Option<Arc<dyn Action>> {
        let mut best: Option<(RouteScore, usize, Arc<dyn Action>)> = None;

        for entry in self.actions.iter() {
            let matched: Vec<usize> = entry
                .keywords
                .iter()
                .filter(|(re, _)| re.is_match(text))
                .map(|(_, len)| *len)
                .collect();
            if matched.is_empty() {
                continue;
            }
            let score = RouteScore {
                hits: matched.len(),
                specificity: matched.iter().sum(),
            };
            let better = best.as_ref().map_or(true, |(best_score, best_seq, _)| {
                score > *best_score || (score == *best_score && entry.seq < *best_seq)
            });
            if better {
                best = Some((score, entry.seq, Arc::clone(&entry.action)));
            }
        }

        best.map(|(score, _, action)| {
            debug!(action = action.name(), hits = score.hits, "routed message");
            action
        })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runtime::ModelClass;
    use serde_json::Value;

    struct NamedAction {
        name: &'static str,
        similes: &'static [&'static str],
        keywords: &'static [&'static str],
    }

    #[async_trait]
    impl Action for NamedAction {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test action"
        }

        fn similes(&self) -> &[&'static str] {
            self.similes
        }

        fn keywords(&self) -> &[&'static str] {
            self.keywords
        }

        async fn validate(&self, _: &dyn AgentRuntime, _: &Memory, _: Option<&State>) -> bool {
            true
        }

        async fn handle(
            &self,
            _: &dyn AgentRuntime,
            _: &Memory,
            _: Option<State>,
            _: Option<&HandlerCallback>,
        ) -> ActionResult {
            ActionResult::success(self.name)
        }
    }

    struct NoopRuntime;

    #[async_trait]
    impl AgentRuntime for NoopRuntime {
        async fn compose_state(&self, _: &Memory) -> Result<State> {
            Ok(State::default())
        }

        async fn update_recent_message_state(&self, state: State) -> Result<State> {
            Ok(state)
        }

        async fn generate_object(&self, _: &str, _: ModelClass) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn registry() -> ActionRegistry {
        let registry = ActionRegistry::new();
        registry
            .register(Arc::new(NamedAction {
                name: "OKTO_TRANSFER",
                similes: &["TRANSFER", "SEND_TOKEN"],
                keywords: &["transfer", "send"],
            }))
            .unwrap();
        registry
            .register(Arc::new(NamedAction {
                name: "OKTO_NFT_TRANSFER",
                similes: &["NFT_TRANSFER"],
                keywords: &["nft", "transfer", "send"],
            }))
            .unwrap();
        registry
    }

    #[test]
    fn test_lookup_by_name_and_simile() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("okto_transfer").unwrap().name(), "OKTO_TRANSFER");
        assert_eq!(registry.get("SEND_TOKEN").unwrap().name(), "OKTO_TRANSFER");
        assert_eq!(registry.get("nft_transfer").unwrap().name(), "OKTO_NFT_TRANSFER");
        assert!(!registry.contains("OKTO_SWAP"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = registry();
        let dup = registry.register(Arc::new(NamedAction {
            name: "okto_transfer",
            similes: &[],
            keywords: &[],
        }));
        assert!(dup.is_err());
        assert_eq!(registry.names(), vec!["OKTO_TRANSFER", "OKTO_NFT_TRANSFER"]);
    }

    #[test]
    fn test_route_prefers_more_hits() {
        let registry = registry();
        assert_eq!(registry.route("send 1 POL to 0xabc").unwrap().name(), "OKTO_TRANSFER");
        assert_eq!(
            registry.route("send my NFT #7 to 0xabc").unwrap().name(),
            "OKTO_NFT_TRANSFER"
        );
        assert!(registry.route("hello there").is_none());
    }

    #[test]
    fn test_route_matches_whole_words() {
        let registry = registry();
        registry
            .register(Arc::new(NamedAction {
                name: "OKTO_GET_PORTFOLIO_NFT",
                similes: &[],
                keywords: &["nfts"],
            }))
            .unwrap();

        // "nft" 不匹配 "nfts"
        assert_eq!(registry.route("show my NFTs").unwrap().name(), "OKTO_GET_PORTFOLIO_NFT");
        assert!(registry.route("transferring").is_none());
    }

    #[test]
    fn test_route_tie_prefers_longer_keyword() {
        let registry = ActionRegistry::new();
        registry
            .register(Arc::new(NamedAction {
                name: "OKTO_GET_PORTFOLIO",
                similes: &[],
                keywords: &["portfolio"],
            }))
            .unwrap();
        registry
            .register(Arc::new(NamedAction {
                name: "OKTO_GET_PORTFOLIO_NFT",
                similes: &[],
                keywords: &["nft portfolio"],
            }))
            .unwrap();

        assert_eq!(registry.route("my nft portfolio").unwrap().name(), "OKTO_GET_PORTFOLIO_NFT");
        assert_eq!(registry.route("my portfolio").unwrap().name(), "OKTO_GET_PORTFOLIO");
    }

    #[test]
    fn test_concurrent_registration() {
        const NAMES: [&str; 8] = ["A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7"];
        let registry = ActionRegistry::new();

        std::thread::scope(|scope| {
            for name in NAMES {
                let registry = &registry;
                scope.spawn(move || {
                    registry
                        .register(Arc::new(NamedAction {
                            name,
                            similes: &[],
                            keywords: &["query"],
                        }))
                        .unwrap();
                    // 同名再注册必须失败
                    assert!(registry
                        .register(Arc::new(NamedAction {
                            name,
                            similes: &[],
                            keywords: &[],
                        }))
                        .is_err());
                });
            }
        });

        let mut names = registry.names();
        assert_eq!(names.len(), NAMES.len());
        names.sort();
        assert_eq!(names, NAMES.to_vec());
        assert!(registry.route("query").is_some());
    }

    #[tokio::test]
    async fn test_registered_action_runs() {
        let registry = registry();
        let action = registry.get("TRANSFER").unwrap();
        let memory = Memory::new("room", "user", "send 1 POL");
        assert!(action.validate(&NoopRuntime, &memory, None).await);
        let result = action.handle(&NoopRuntime, &memory, None, None).await;
        assert_eq!(result, ActionResult::success("OKTO_TRANSFER"));
    }
}
