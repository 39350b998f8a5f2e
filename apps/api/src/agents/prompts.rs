// Prompt templates for LLM interactions
//
// Each agent role sends one fixed system instruction followed by the raw
// user input. The instruction also defines the JSON shape the role must
// return. Prompts are versioned so runs can be traced back to the wording.

/// Prompt template structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    pub system: String,
}

pub mod library {
    use super::PromptTemplate;

    pub fn task_planning() -> PromptTemplate {
        PromptTemplate {
            name: "task_planning".to_string(),
            version: "1.0.0".to_string(),
            system: "You are a task planning expert. Your role is to:\n\
                     1. Analyze complex tasks\n\
                     2. Break them down into clear, actionable subtasks\n\
                     3. Identify dependencies between subtasks\n\
                     4. Suggest optimal execution order\n\n\
                     IMPORTANT: Return ONLY a valid JSON object with the following structure, \
                     no markdown formatting or additional text:\n\
                     {\n\
                     \x20   \"subtasks\": [\n\
                     \x20       {\n\
                     \x20           \"id\": \"unique_id\",\n\
                     \x20           \"description\": \"clear description\",\n\
                     \x20           \"dependencies\": [\"other_task_ids\"],\n\
                     \x20           \"estimated_time\": \"time estimate\"\n\
                     \x20       }\n\
                     \x20   ],\n\
                     \x20   \"execution_order\": [\"task_id1\", \"task_id2\"]\n\
                     }"
                .to_string(),
        }
    }

    pub fn task_execution() -> PromptTemplate {
        PromptTemplate {
            name: "task_execution".to_string(),
            version: "1.0.0".to_string(),
            system: "You are an execution expert. Your role is to:\n\
                     1. Execute specific tasks with attention to detail\n\
                     2. Provide comprehensive results\n\
                     3. Include relevant data and insights\n\
                     4. Focus on actionable solutions and recommendations\n\n\
                     IMPORTANT: Return ONLY a valid JSON object with the following structure, \
                     no markdown formatting or additional text.\n\
                     Focus on providing solutions and actionable steps rather than listing limitations.\n\
                     If you encounter limitations, provide alternative approaches or next steps instead.\n\n\
                     {\n\
                     \x20   \"task_id\": \"id_of_the_task\",\n\
                     \x20   \"status\": \"completed|in_progress|failed\",\n\
                     \x20   \"results\": {\n\
                     \x20       \"main_findings\": \"detailed results and actionable steps\",\n\
                     \x20       \"supporting_data\": \"relevant data points and considerations\",\n\
                     \x20       \"recommendations\": \"specific next steps and implementation suggestions\"\n\
                     \x20   },\n\
                     \x20   \"execution_time\": \"time estimate\",\n\
                     \x20   \"issues\": [\"only include critical issues that need immediate attention\"]\n\
                     }"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::library;

    #[test]
    fn planning_prompt_describes_plan_shape() {
        let prompt = library::task_planning();

        assert_eq!(prompt.name, "task_planning");
        assert!(prompt.system.contains("\"subtasks\""));
        assert!(prompt.system.contains("\"execution_order\""));
    }

    #[test]
    fn execution_prompt_prefers_actionable_output() {
        let prompt = library::task_execution();

        assert!(prompt.system.contains("\"main_findings\""));
        assert!(prompt.system.contains("rather than listing limitations"));
    }
}
