//! Text reports for the command line.

use saga_quests::prelude::*;
use std::collections::HashSet;
use std::fmt::Write;

/// Prerequisites and unlocks naming quests that were not loaded.
pub fn dangling_links(quests: &[Quest]) -> Vec<String> {
    let known: HashSet<&str> = quests.iter().map(|q| q.id().as_str()).collect();
    let mut problems = Vec::new();
    for quest in quests {
        for prerequisite in quest.prerequisites() {
            if !known.contains(prerequisite.as_str()) {
                problems.push(format!("{}: unknown prerequisite '{}'", quest.id(), prerequisite));
            }
        }
        for unlock in quest.unlocks() {
            if !known.contains(unlock.as_str()) {
                problems.push(format!("{}: unlocks unknown quest '{}'", quest.id(), unlock));
            }
        }
    }
    problems
}

/// Chapter and consequence references to quests that were not loaded.
pub fn story_problems(story: &StoryContent, quests: &[Quest]) -> Vec<String> {
    let known: HashSet<&str> = quests.iter().map(|q| q.id().as_str()).collect();
    let mut problems = Vec::new();

    for chapter in &story.chapters {
        for id in chapter.main_quests.iter().chain(&chapter.side_quests) {
            if !known.contains(id.as_str()) {
                problems.push(format!("chapter {}: unknown quest '{}'", chapter.id, id));
            }
        }
        for decision in &chapter.decision_points {
            if !story.decision_points.contains_key(decision) {
                problems.push(format!("chapter {}: unknown decision point '{}'", chapter.id, decision));
            }
        }
    }

    for decision in story.decision_points.values() {
        for (choice, consequences) in &decision.consequences {
            for consequence in consequences {
                let target = match consequence {
                    Consequence::UnlockQuest { quest_id }
                    | Consequence::CompleteQuest { quest_id }
                    | Consequence::FailQuest { quest_id, .. } => quest_id,
                    _ => continue,
                };
                if !known.contains(target.as_str()) {
                    problems.push(format!(
                        "decision {} / {}: unknown quest '{}'",
                        decision.id, choice, target
                    ));
                }
            }
        }
    }
    problems
}

/// One line per partition, plus progress for active quests.
pub fn partition_summary(quests: &QuestManager) -> String {
    let mut out = String::new();
    for location in QuestLocation::ALL {
        let ids: Vec<String> = quests
            .quest_ids(location)
            .iter()
            .map(ToString::to_string)
            .collect();
        let _ = writeln!(out, "{:<10} {:>3}  {}", location, ids.len(), ids.join(", "));
    }
    for summary in quests.active_summaries() {
        let _ = writeln!(out, "  {} ({:.0}%)", summary.title, summary.progress * 100.0);
        for objective in &summary.objectives {
            let mark = if objective.complete { 'x' } else { ' ' };
            let _ = writeln!(
                out,
                "    [{}] {} {}/{}",
                mark, objective.description, objective.current, objective.required
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_common::QuestId;

    #[test]
    fn test_fallback_has_no_dangling_links() {
        assert!(dangling_links(&fallback_quests()).is_empty());
    }

    #[test]
    fn test_dangling_links_reported() {
        let quests = vec![Quest::new("a", "A", "").with_prerequisite("ghost").with_unlock("b")];
        let problems = dangling_links(&quests);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("ghost"));
    }

    #[test]
    fn test_loaded_content_with_dangling_unlock() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            dir.path().join("quests.json"),
            r#"{"quests": [
                {"id": "m1", "title": "Main", "unlocks": ["m2"]},
                {"id": "m2", "title": "Second", "prerequisites": ["m1"], "unlocks": ["m3"]}
            ]}"#,
        )
        .expect("write");
        let config = SagaConfig::with_content_dir(dir.path());

        let mut loader = QuestLoader::new(&config);
        let quests = loader.load_all();
        assert_eq!(quests.len(), 2);

        let problems = dangling_links(&quests);
        assert_eq!(problems, vec!["m2: unlocks unknown quest 'm3'".to_string()]);
    }

    #[test]
    fn test_story_problems() {
        let mut story = StoryContent::default();
        story.chapters.push(StoryChapter {
            id: "ch1".to_string(),
            title: "One".to_string(),
            main_quests: vec![QuestId::new("missing")],
            decision_points: vec!["nowhere".to_string()],
            ..StoryChapter::default()
        });
        let problems = story_problems(&story, &fallback_quests());
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_partition_summary_lists_active_objectives() {
        let mut quests = QuestManager::new();
        quests.install_fallback();
        let player = PlayerState::new(1);
        quests.start_quest(FIRST_STEPS, &player).expect("start");

        let text = partition_summary(&quests);
        assert!(text.contains("First Steps"));
        assert!(text.contains("[ ] Talk to the village elder 0/1"));
    }
}
