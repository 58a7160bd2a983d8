//! Static fallback generator: canned posts used when no live provider answers.
//!
//! Content is picked by keyword from the request topic, so the same topic
//! always yields the same post.

use async_trait::async_trait;
use linkpost_core::error::Result;
use linkpost_core::traits::{ContentGenerator, GenerationRequest};

/// One canned post and the topic keywords that select it.
struct CannedPost {
    keywords: &'static [&'static str],
    body: &'static str,
}

const NEXTJS: CannedPost = CannedPost {
    keywords: &["next.js", "nextjs", "next"],
    body: "⚡ Server Components changed how I think about data loading

We moved our dashboard to the Next.js App Router last quarter. The wins were bigger than expected:

• Client bundle shrank noticeably once data fetching moved to the server
• Layouts stopped re-rendering on every navigation
• Streaming made slow widgets stop blocking the whole page

The biggest shift was mental: fetch where the data is used, not at the top of the tree.

What surprised you most when adopting the App Router?

#NextJS #React #WebPerformance #FrontendDevelopment",
};

const REACT: CannedPost = CannedPost {
    keywords: &["react", "react.js", "reactjs", "hooks"],
    body: "🔄 From lifecycle methods to hooks: what actually changed

Moving a large codebase from class components to hooks taught me one thing: effects are about synchronization, not lifecycles.

Once the team stopped asking \"when does this run?\" and started asking \"what does this stay in sync with?\", our bugs dropped and our components got smaller.

Three habits that helped:
1. One effect per concern
2. Custom hooks for anything reused twice
3. Cleanup functions written before the effect body

How has your team's mental model of React evolved?

#ReactJS #JavaScript #WebDevelopment #ProgrammingTips",
};

const API: CannedPost = CannedPost {
    keywords: &["api", "apis", "rest", "graphql", "backend"],
    body: "🔌 REST or GraphQL? After shipping both, my answer is \"it depends\" — on purpose

REST works best when resources are clear, caching matters and many clients integrate with you.

GraphQL shines when screens need flexible shapes and the frontend iterates quickly.

What works for us today:
- GraphQL for product data
- REST for uploads and webhooks
- One shared auth layer in front of both

What drives your choice between the two?

#APIDesign #BackendDevelopment #GraphQL #REST",
};

const PERFORMANCE: CannedPost = CannedPost {
    keywords: &["performance", "speed", "optimization", "optimisation"],
    body: "⚡ Performance is a feature your users notice before any other

Our last optimization sprint focused on three things:

1. Images: responsive sizes, modern formats, long-lived cache headers
2. JavaScript: bundle analysis, route-level code splitting, less hydration
3. Backend: a cache in front of hot queries and better indexes

None of it was glamorous. All of it was measurable.

Which single change gave your app its biggest speed-up?

#WebPerformance #Frontend #Optimization #UserExperience",
};

const AI: CannedPost = CannedPost {
    keywords: &["ai", "llm", "llms", "copilot", "ml"],
    body: "🤖 The AI tools that stuck in my workflow this year

Plenty of AI tools are hype. A few quietly earned a permanent place:

• Code completion for boilerplate and tests
• Review assistants that catch what tired eyes miss
• Drafting docs and error messages people can actually follow

The trick is treating the output as a first draft, never as the final answer.

Which AI tools have you kept, and which did you drop?

#AI #DeveloperTools #Productivity #SoftwareEngineering",
};

const WEB_DEVELOPMENT: CannedPost = CannedPost {
    keywords: &[],
    body: "💻 Small workflow changes compound faster than big rewrites

After years of tweaking how I work, these stuck:

1. Architecture decisions in the morning, while focus is fresh
2. Implementation blocks in the afternoon, notifications off
3. Reviews and docs at the end of the day

And one rule above all: two hours a week reserved for learning something new.

What is one habit that changed how you build software?

#WebDevelopment #DeveloperProductivity #CodingLife #TechCareers",
};

const CATALOG: &[CannedPost] = &[NEXTJS, REACT, API, PERFORMANCE, AI];

/// Offline generator with a fixed catalog of posts. Never fails.
#[derive(Debug, Default, Clone)]
pub struct StaticContentGenerator;

impl StaticContentGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Pick the canned post for a topic.
    pub fn content_for(topic: &str) -> &'static str {
        let lower = topic.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '.'))
            .map(|w| w.trim_matches('.'))
            .filter(|w| !w.is_empty())
            .collect();

        CATALOG
            .iter()
            .find(|post| post.keywords.iter().any(|k| words.contains(k)))
            .unwrap_or(&WEB_DEVELOPMENT)
            .body
    }
}

#[async_trait]
impl ContentGenerator for StaticContentGenerator {
    fn name(&self) -> &str {
        "static-fallback"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        tracing::info!("📦 Using canned content for topic '{}'", request.topic);
        Ok(Self::content_for(&request.topic).to_string())
    }
}
