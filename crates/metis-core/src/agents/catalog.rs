//! The standard planning agent set
//!
//! Each agent is one planning facet: a prompt template over the project
//! description plus the parser for its reply. Prompts ask for JSON only;
//! the sample shapes keep small models on track.

use super::{parse, AgentSpec, PromptContext};

/// Build the standard specs in `/agents` listing order
pub(super) fn standard_specs() -> Vec<AgentSpec> {
    vec![
        AgentSpec {
            name: "architect",
            title: "Architect",
            prompt: architect_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "pm",
            title: "Project Manager",
            prompt: pm_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "cost",
            title: "Cost Estimator",
            prompt: cost_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "security",
            title: "Security",
            prompt: security_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "devops",
            title: "DevOps",
            prompt: devops_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "performance",
            title: "Performance",
            prompt: performance_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "data",
            title: "Data Platform",
            prompt: data_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "ux",
            title: "UX",
            prompt: ux_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "datasci",
            title: "Data Scientist",
            prompt: datasci_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "aicoding",
            title: "AI Coding",
            prompt: aicoding_prompt,
            parse: parse::parse_object,
        },
        AgentSpec {
            name: "docs",
            title: "Documentation",
            prompt: docs_prompt,
            parse: parse::parse_document,
        },
    ]
}

fn architect_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are a principal cloud architect.\n\
         Project: {}\n\
         Propose a target architecture. Return only JSON with keys:\n\
         \"architecture_pattern\" (string), \"language_stack\" (object),\n\
         \"cloud\" (object keyed by provider), \"infrastructure_as_code\" (string),\n\
         \"ci_cd\" (string), \"observability\" (object), \"security\" (array of strings).",
        ctx.description
    )
}

fn pm_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are a certified project manager planning at daily, 8-hour granularity.\n\
         Project: {}\n\
         Return only JSON:\n\
         {{\"duration_days\": <int>, \"gantt\": [{{\"day\": <int>, \"task\": <string>, \"owner\": <string>}}]}}",
        ctx.description
    )
}

fn cost_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are a FinOps expert working at daily granularity.\n\
         Project: {}\n\
         Estimate labor, cloud and other costs per day and in total. Keep numbers numeric.\n\
         Return only JSON with keys \"currency\", \"assumptions\" (3-5 short strings),\n\
         \"daily_breakdown\" (array of {{\"day\", \"task\", \"roles\", \"cloud\", \"other\", \"total_daily\"}})\n\
         and \"summary\" ({{\"total_days\", \"labor_cost\", \"cloud_cost\", \"other_cost\", \"total_cost\"}}).",
        ctx.description
    )
}

fn security_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are the security lead for a cloud platform.\n\
         Project: {}\n\
         Return only JSON:\n\
         {{\"threat_model\": [..], \"controls\": [..], \"compliance\": [..], \"pen_test_plan\": [..]}}",
        ctx.description
    )
}

fn devops_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are a DevOps lead for containerized microservices with GitOps delivery.\n\
         Project: {}\n\
         Return only JSON with keys \"containerization\", \"kubernetes\", \"gitops\",\n\
         \"ci_cd\" and \"observability\", each an object of concrete choices.",
        ctx.description
    )
}

fn performance_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are a performance engineer.\n\
         Project: {}\n\
         Return only JSON with keys \"service_slo\" ({{\"p99_latency_ms\", \"availability\"}}),\n\
         \"bottleneck_risks\" (array), \"tuning\" (object), \"test_plan\" (object)\n\
         and \"capacity_model\" (object).",
        ctx.description
    )
}

fn data_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are a data platform engineer for a transactional system.\n\
         Project: {}\n\
         Return only JSON with keys \"storage\", \"schema_governance\", \"pipelines\"\n\
         and \"dq\", each an object of concrete choices.",
        ctx.description
    )
}

fn ux_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are the UX lead for a product with secure user flows.\n\
         Project: {}\n\
         Return only JSON:\n\
         {{\"personas\": [{{\"name\", \"goals\", \"risks\"}}], \"journeys\": [{{\"name\", \"steps\", \"friction_points\"}}],\n\
          \"ui_patterns\": [..], \"non_functional\": [..]}}",
        ctx.description
    )
}

fn datasci_prompt(ctx: &PromptContext) -> String {
    let mut prompt = format!(
        "You are a data scientist estimating delivery effort.\n\
         Project: {}\n",
        ctx.description
    );
    if let Some(summary) = &ctx.dataset_summary {
        prompt.push_str(&format!(
            "A reference dataset of past projects is available: {summary}\n\
             Ground your estimate in that dataset's shape.\n"
        ));
    }
    prompt.push_str(
        "Return only JSON:\n\
         {\"estimation_approach\": <string>, \"features_needed\": [..],\n\
          \"effort_range_person_days\": {\"low\": <int>, \"high\": <int>}, \"risks\": [..]}",
    );
    prompt
}

fn aicoding_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are an AI coding assistant evaluating a software project.\n\
         Project: {}\n\
         List the major features that could be delegated to AI code generation,\n\
         with an estimated coverage percentage for each. Return only JSON:\n\
         {{\"delegable_features\": [{{\"feature\": <string>, \"ai_coverage_percent\": <int>, \"notes\": <string>}}]}}",
        ctx.description
    )
}

fn docs_prompt(ctx: &PromptContext) -> String {
    format!(
        "You are a senior technical writer.\n\
         Draft technical documentation summarizing the project's goals,\n\
         architecture and key technology choices.\n\
         Return JSON with a single key \"documentation\" containing markdown text.\n\
         PROJECT_DESCRIPTION: {}",
        ctx.description
    )
}
