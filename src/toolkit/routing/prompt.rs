

use super::partitions::PartitionRegistry;
use crate::toolkit::session::models::Turn;


pub fn build_namespace_system_prompt(registry: &PartitionRegistry, history: &[Turn]) -> String {
    let mut prompt = String::from(
        "You are a classifier that picks the most relevant namespace(s) for a student's query. \
         Each namespace is one category of information about the university's courses and services.\n\
         Available namespaces:\n\n",
    );

    for partition in registry.iter() {
        prompt.push_str(&format!(
            "Namespace: {}\nDescription: {}\n\n",
            partition.id, partition.description
        ));
    }

    if !history.is_empty() {
        prompt.push_str(
            "Recent conversation, oldest first. Use it to resolve references such as \"it\" or \"that course\":\n",
        );
        for turn in history {
            prompt.push_str(&format!(
                "Student: {}\nAssistant: {}\n",
                turn.user_utterance, turn.bot_response
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Choose one or more namespaces that match the query. Return only the namespace names \
         separated by commas (e.g. 'computer-science-bsc-hons, computer-science-mphil-phd'). \
         Do not add explanations or any other words. If nothing matches, return NONE.",
    );
    prompt
}


pub fn build_namespace_user_prompt(query: &str) -> String {
    format!("User query: {query}")
}


pub const INTENT_SYSTEM_PROMPT: &str = "You classify the intent of a message sent to a university enquiry assistant. \
Decide if the query is:\n\
- 'course_info' if the user asks about details of a specific course, or the query is a general FAQ.\n\
- 'course_comparison' if the user is comparing two or more courses.\n\
- 'recommendation' if the user wants course suggestions based on their interests or background.\n\
Return only 'course_info', 'course_comparison', or 'recommendation'.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_partitions;

    #[test]
    fn test_system_prompt_enumerates_every_partition() {
        let registry = PartitionRegistry::new(&default_partitions(), 3).unwrap();
        let prompt = build_namespace_system_prompt(&registry, &[]);
        for partition in registry.iter() {
            assert!(prompt.contains(&format!("Namespace: {}", partition.id)));
            assert!(prompt.contains(&partition.description));
        }
        assert!(!prompt.contains("Recent conversation"));
    }

    #[test]
    fn test_system_prompt_includes_history_in_order() {
        let registry = PartitionRegistry::new(&default_partitions(), 3).unwrap();
        let history = vec![
            Turn::new("Tell me about the AI degree", "It is a three-year BSc."),
            Turn::new("What are its modules?", "Machine learning, robotics..."),
        ];
        let prompt = build_namespace_system_prompt(&registry, &history);
        let first = prompt.find("Tell me about the AI degree").unwrap();
        let second = prompt.find("What are its modules?").unwrap();
        assert!(first < second);
    }
}
