//! Tool dispatch: turns a named request with a loosely-typed argument
//! bundle into a query or simulation call.
//!
//! RULE: A missing block group is an answer, not a failure.
//! NotFound comes back as `ToolOutcome::NotFound` so a conversational
//! caller can narrate it. Bad arguments and unknown tools are errors.

use crate::{
    config::EquityConfig,
    error::{EquityError, EquityResult},
    query::{self, AreaStatistics, Comparison, RankOrder},
    record::{BlockGroupRecord, Metric},
    simulation::{
        CausalLoopModel, CausalLoopResult, Intervention, InterventionKind, SpilloverModel,
        SpilloverResult,
    },
    store::RecordStore,
    types::{is_valid_geoid, Geoid},
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::{fmt, str::FromStr, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    GetRecord,
    TopAreas,
    Compare,
    CausalLoop,
    Spillover,
    Statistics,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::GetRecord,
        ToolName::TopAreas,
        ToolName::Compare,
        ToolName::CausalLoop,
        ToolName::Spillover,
        ToolName::Statistics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetRecord  => "get_record",
            Self::TopAreas   => "top_areas",
            Self::Compare    => "compare",
            Self::CausalLoop => "causal_loop",
            Self::Spillover  => "spillover",
            Self::Statistics => "statistics",
        }
    }

    /// Name advertised to the conversational agent.
    pub fn agent_name(&self) -> &'static str {
        match self {
            Self::GetRecord  => "getBlockGroup",
            Self::TopAreas   => "findTopAreas",
            Self::Compare    => "compareBlockGroups",
            Self::CausalLoop => "simulateCausalLoop",
            Self::Spillover  => "simulateSpillover",
            Self::Statistics => "getAreaStatistics",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = EquityError;

    fn from_str(s: &str) -> EquityResult<Self> {
        ToolName::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s || t.agent_name() == s)
            .ok_or_else(|| EquityError::UnknownTool { name: s.to_string() })
    }
}

/// Successful tool payload, serialized without a wrapper tag.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Record(BlockGroupRecord),
    TopAreas(Vec<BlockGroupRecord>),
    Comparison(Comparison),
    CausalLoop(Box<CausalLoopResult>),
    Spillover(SpilloverResult),
    Statistics(AreaStatistics),
}

impl ToolResult {
    /// Block groups this result refers to, for map highlighting.
    pub fn geoids(&self) -> Vec<Geoid> {
        match self {
            Self::Record(r)     => vec![r.geoid.clone()],
            Self::TopAreas(rs)  => rs.iter().map(|r| r.geoid.clone()).collect(),
            Self::Comparison(c) => vec![c.bg1.geoid.clone(), c.bg2.geoid.clone()],
            Self::CausalLoop(c) => vec![c.baseline.geoid.clone()],
            Self::Spillover(s)  => std::iter::once(s.primary.geoid.clone())
                .chain(s.spillover.iter().map(|n| n.geoid.clone()))
                .collect(),
            Self::Statistics(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success {
        tool:   ToolName,
        result: ToolResult,
        geoids: Vec<Geoid>,
    },
    NotFound {
        tool:    ToolName,
        geoids:  Vec<Geoid>,
        message: String,
    },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn result(&self) -> Option<&ToolResult> {
        match self {
            Self::Success { result, .. } => Some(result),
            Self::NotFound { .. } => None,
        }
    }
}

/// Description of one tool, as published to the conversational agent.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name:         &'static str,
    pub description:  &'static str,
    pub input_schema: Value,
}

pub struct ToolDispatcher {
    store:     Arc<RecordStore>,
    config:    EquityConfig,
    causal:    CausalLoopModel,
    spillover: SpilloverModel,
}

impl ToolDispatcher {
    pub fn new(store: Arc<RecordStore>, config: EquityConfig) -> Self {
        Self {
            causal:    CausalLoopModel::build(config.decay_months),
            spillover: SpilloverModel::new(config.spillover_share),
            store,
            config,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn config(&self) -> &EquityConfig {
        &self.config
    }

    /// Validate `args`, run the named tool and wrap its result.
    pub fn dispatch(&self, name: &str, args: &Value) -> EquityResult<ToolOutcome> {
        let tool = name.parse::<ToolName>().inspect_err(|_| {
            log::warn!("dispatch: unknown tool '{name}'");
        })?;
        let args = ToolArgs::new(args).inspect_err(|e| {
            log::warn!("dispatch: {tool} rejected: {e}");
        })?;

        match self.run(tool, &args) {
            Ok(result) => {
                log::debug!("dispatch: {tool} ok");
                Ok(ToolOutcome::Success {
                    tool,
                    geoids: result.geoids(),
                    result,
                })
            }
            Err(EquityError::NotFound { geoids }) => {
                log::info!("dispatch: {tool} found no block group {}", geoids.join(", "));
                Ok(ToolOutcome::NotFound {
                    tool,
                    message: format!("No block group with GEOID {}", geoids.join(" or ")),
                    geoids,
                })
            }
            Err(e) => {
                log::warn!("dispatch: {tool} rejected: {e}");
                Err(e)
            }
        }
    }

    fn run(&self, tool: ToolName, args: &ToolArgs<'_>) -> EquityResult<ToolResult> {
        match tool {
            ToolName::GetRecord => {
                let geoid = args.geoid("geoid")?;
                Ok(ToolResult::Record(self.store.require(geoid)?.clone()))
            }
            ToolName::TopAreas => {
                let metric: Metric = args.required_str("metric")?.parse()?;
                let limit = args.limit("limit", self.config.default_top_limit, None)?;
                let order = match args.optional_str("order")? {
                    Some(o) => o.parse()?,
                    None => RankOrder::default(),
                };
                Ok(ToolResult::TopAreas(query::top_areas(
                    self.store.records(),
                    metric,
                    limit,
                    order,
                )))
            }
            ToolName::Compare => {
                let geoid1 = args.geoid("geoid1")?;
                let geoid2 = args.geoid("geoid2")?;
                Ok(ToolResult::Comparison(query::compare(&self.store, geoid1, geoid2)?))
            }
            ToolName::CausalLoop => {
                let geoid = args.geoid("geoid")?;
                let intervention = self.intervention(args)?;
                let record = self.store.require(geoid)?;
                Ok(ToolResult::CausalLoop(Box::new(self.causal.project(record, &intervention))))
            }
            ToolName::Spillover => {
                let geoid = args.geoid("geoid")?;
                let intervention = self.intervention(args)?;
                let neighbor_limit = args.limit(
                    "neighbor_limit",
                    self.config.default_neighbor_limit,
                    Some(self.config.max_neighbor_limit),
                )?;
                let record = self.store.require(geoid)?;
                let neighbors = self.store.neighbors_of(geoid, neighbor_limit);
                Ok(ToolResult::Spillover(self.spillover.project(record, &neighbors, &intervention)))
            }
            ToolName::Statistics => Ok(ToolResult::Statistics(query::statistics(
                self.store.records(),
                self.config.high_risk_threshold,
            )?)),
        }
    }

    fn intervention(&self, args: &ToolArgs<'_>) -> EquityResult<Intervention> {
        let kind: InterventionKind = args.required_str("intervention_type")?.parse()?;
        let amount = args.required_number("amount")?;
        if amount < 0.0 {
            return Err(EquityError::validation("amount", "must not be negative"));
        }
        let duration = match args.whole_number("duration_months")? {
            Some(d) => d,
            None => u64::from(self.config.default_duration_months),
        };
        if duration == 0 || duration > u64::from(self.config.max_duration_months) {
            return Err(EquityError::validation(
                "duration_months",
                format!("must be between 1 and {}", self.config.max_duration_months),
            ));
        }
        // duration fits in u32: bounded by max_duration_months above.
        Ok(Intervention::new(kind, amount, duration as u32))
    }
}

/// Typed accessors over a JSON argument object.
struct ToolArgs<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> ToolArgs<'a> {
    fn new(args: &'a Value) -> EquityResult<Self> {
        match args {
            Value::Object(map) => Ok(Self { map: Some(map) }),
            Value::Null => Ok(Self { map: None }),
            _ => Err(EquityError::validation("args", "expected a JSON object")),
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(field)).filter(|v| !v.is_null())
    }

    fn optional_str(&self, field: &str) -> EquityResult<Option<&'a str>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(EquityError::validation(field, "expected a string")),
        }
    }

    fn required_str(&self, field: &str) -> EquityResult<&'a str> {
        self.optional_str(field)?
            .ok_or_else(|| EquityError::validation(field, "is required"))
    }

    fn geoid(&self, field: &str) -> EquityResult<&'a str> {
        let geoid = self.required_str(field)?;
        if !is_valid_geoid(geoid) {
            return Err(EquityError::validation(field, format!("'{geoid}' is not a 12-digit GEOID")));
        }
        Ok(geoid)
    }

    fn required_number(&self, field: &str) -> EquityResult<f64> {
        let value = self
            .get(field)
            .ok_or_else(|| EquityError::validation(field, "is required"))?;
        match value.as_f64() {
            Some(n) if n.is_finite() => Ok(n),
            _ => Err(EquityError::validation(field, "expected a finite number")),
        }
    }

    /// Non-negative integer; whole-valued floats such as `5.0` are accepted.
    fn whole_number(&self, field: &str) -> EquityResult<Option<u64>> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        if let Some(n) = value.as_u64() {
            return Ok(Some(n));
        }
        match value.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                Ok(Some(f as u64))
            }
            _ => Err(EquityError::validation(field, "expected a non-negative integer")),
        }
    }

    /// Positive count, capped at `max` when one is given.
    fn limit(&self, field: &str, default: usize, max: Option<usize>) -> EquityResult<usize> {
        let Some(n) = self.whole_number(field)? else {
            return Ok(default);
        };
        if n == 0 {
            return Err(EquityError::validation(field, "must be at least 1"));
        }
        match max {
            Some(max) if n > max as u64 => {
                Err(EquityError::validation(field, format!("must be between 1 and {max}")))
            }
            _ => Ok(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }
}

/// Tool descriptions for the conversational agent, one per tool.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let metrics: Vec<&str> = Metric::ALL.iter().map(|m| m.as_str()).collect();
    let kinds: Vec<&str> = InterventionKind::ALL.iter().map(|k| k.as_str()).collect();
    let geoid = json!({ "type": "string", "description": "12-digit block group GEOID" });
    let intervention = json!({
        "intervention_type": { "type": "string", "enum": kinds },
        "amount": {
            "type": "number",
            "description": "Dollars for htf_investment; percentage points otherwise"
        },
        "duration_months": { "type": "integer", "minimum": 1, "default": 12 }
    });

    let with_geoid = |extra: &Value| {
        let mut props = Map::new();
        props.insert("geoid".to_string(), geoid.clone());
        if let Value::Object(extra) = extra {
            props.extend(extra.clone());
        }
        Value::Object(props)
    };

    vec![
        ToolDefinition {
            name:         ToolName::GetRecord.agent_name(),
            description:  "Get all scores and attributes for one block group.",
            input_schema: json!({
                "type": "object",
                "properties": with_geoid(&Value::Null),
                "required": ["geoid"]
            }),
        },
        ToolDefinition {
            name:         ToolName::TopAreas.agent_name(),
            description:  "Rank block groups by a metric and return the top N.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "metric": { "type": "string", "enum": metrics },
                    "limit":  { "type": "integer", "minimum": 1, "default": 5 },
                    "order":  { "type": "string", "enum": ["highest", "lowest"], "default": "highest" }
                },
                "required": ["metric"]
            }),
        },
        ToolDefinition {
            name:         ToolName::Compare.agent_name(),
            description:  "Compare two block groups metric by metric (first minus second).",
            input_schema: json!({
                "type": "object",
                "properties": { "geoid1": geoid, "geoid2": geoid },
                "required": ["geoid1", "geoid2"]
            }),
        },
        ToolDefinition {
            name:         ToolName::CausalLoop.agent_name(),
            description:  "Project monthly score trajectories under an intervention, with feedback loops.",
            input_schema: json!({
                "type": "object",
                "properties": with_geoid(&intervention),
                "required": ["geoid", "intervention_type", "amount"]
            }),
        },
        ToolDefinition {
            name:         ToolName::Spillover.agent_name(),
            description:  "Estimate how an intervention spills over to neighbouring block groups.",
            input_schema: json!({
                "type": "object",
                "properties": with_geoid(&intervention),
                "required": ["geoid", "intervention_type", "amount"]
            }),
        },
        ToolDefinition {
            name:         ToolName::Statistics.agent_name(),
            description:  "County-wide summary statistics across all block groups.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}
