//! Results aggregation: a pure reduction over a survey and its responses.

use std::collections::{HashMap, HashSet};

use crate::model::{
    api::results::{OptionTally, QuestionResults, SurveyResults},
    common::{Question, QuestionType},
    db::{response::Response, survey::Survey},
};

/// Summarise the given responses to a survey.
///
/// Responses for other surveys must already have been filtered out.
pub fn summarize(survey: &Survey, responses: &[Response]) -> SurveyResults {
    let total = responses.len() as u64;
    let questions = survey
        .questions
        .iter()
        .map(|question| match question.kind {
            QuestionType::MultipleChoice => tally_choices(question, responses, total),
            QuestionType::Text => collect_text(question, responses),
        })
        .collect();

    SurveyResults {
        survey_id: survey.id.into(),
        title: survey.title.clone(),
        total_responses: total,
        latest_response_at: responses.iter().map(|r| r.created_at).max(),
        questions,
    }
}

/// Count how often each declared option was picked.
///
/// A response counts once for each distinct declared option it names, whether
/// it gave a single answer or a list. Anything else is ignored. Tallies are
/// keyed by option text, so repeated options in stored data share one count.
fn tally_choices(question: &Question, responses: &[Response], total: u64) -> QuestionResults {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for answer in responses.iter().filter_map(|r| r.answer_to(&question.id)) {
        let distinct: HashSet<&str> = answer
            .answer
            .picked()
            .iter()
            .map(String::as_str)
            .filter(|picked| question.has_option(picked))
            .collect();
        for picked in distinct {
            *counts.entry(picked).or_default() += 1;
        }
    }

    let options = question
        .options
        .iter()
        .map(|option| {
            let count = counts.get(option.as_str()).copied().unwrap_or(0);
            OptionTally {
                option: option.clone(),
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();

    QuestionResults::MultipleChoice {
        question_id: question.id.clone(),
        question: question.question.clone(),
        options,
    }
}

/// List every answer given to a text question.
fn collect_text(question: &Question, responses: &[Response]) -> QuestionResults {
    let answers = responses
        .iter()
        .filter_map(|response| response.answer_to(&question.id))
        .map(|answer| answer.answer.to_text())
        .collect();

    QuestionResults::Text {
        question_id: question.id.clone(),
        question: question.question.clone(),
        answers,
    }
}

/// `count / total` as a whole percentage, rounding halves up.
pub fn percentage(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}
