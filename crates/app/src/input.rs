//! Turns a typed line into an [`Answer`] for the exercise on screen.
//!
//! Choices are picked by their 1-based number as printed by `render`:
//! - single select: `2`
//! - multiple select / construct: `1 3 4` (construct keeps the order)
//! - match pairs: `1-2 2-1` (left number, right number)
//! - sort boxes: `1:1 2:2` (item number, box number)

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use lesson_core::model::{Answer, Exercise, ExerciseBody, Pair};

/// Right-hand side of a match-pairs exercise in display order.
///
/// Sorted so the listing does not mirror the answer key.
pub fn right_choices(pairs: &[Pair]) -> Vec<&str> {
    let mut rights: Vec<&str> = pairs.iter().map(|p| p.right.as_str()).collect();
    rights.sort_unstable();
    rights.dedup();
    rights
}

pub fn parse_answer(exercise: &Exercise, line: &str) -> Result<Answer> {
    let tokens: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        bail!("no answer given");
    }

    match exercise.body() {
        ExerciseBody::SingleSelect { options, .. } => {
            if let Some(option) = options.iter().find(|o| o.as_str() == line.trim()) {
                return Ok(Answer::choice(option.clone()));
            }
            let [token] = tokens.as_slice() else {
                bail!("pick exactly one option");
            };
            Ok(Answer::choice(pick(options, token)?))
        }
        ExerciseBody::MultipleSelect { options, .. } => {
            let picked = tokens
                .iter()
                .map(|t| pick(options, t))
                .collect::<Result<Vec<_>>>()?;
            Ok(Answer::choices(picked))
        }
        ExerciseBody::Construct {
            available_blocks, ..
        } => {
            let mut used = vec![false; available_blocks.len()];
            let mut sequence = Vec::with_capacity(tokens.len());
            for token in &tokens {
                let index = number(token, available_blocks.len())?;
                if std::mem::replace(&mut used[index], true) {
                    bail!("block {token} is already used");
                }
                sequence.push(available_blocks[index].clone());
            }
            Ok(Answer::sequence(sequence))
        }
        ExerciseBody::MatchPairs { pairs } => {
            let rights = right_choices(pairs);
            let mut matched = Vec::with_capacity(tokens.len());
            for token in &tokens {
                let (left, right) = token
                    .split_once('-')
                    .with_context(|| format!("expected left-right, got {token:?}"))?;
                let left = &pairs[number(left, pairs.len())?].left;
                let right = rights[number(right, rights.len())?];
                matched.push((left.clone(), right.to_owned()));
            }
            Ok(Answer::pairs(matched))
        }
        ExerciseBody::SortBoxes {
            items, categories, ..
        } => {
            let mut placements: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for token in &tokens {
                let (item, category) = token
                    .split_once(':')
                    .with_context(|| format!("expected item:box, got {token:?}"))?;
                let item = &items[number(item, items.len())?];
                let category = &categories[number(category, categories.len())?];
                placements
                    .entry(category.clone())
                    .or_default()
                    .push(item.clone());
            }
            Ok(Answer::Placements(placements))
        }
    }
}

fn pick(options: &[String], token: &str) -> Result<String> {
    Ok(options[number(token, options.len())?].clone())
}

// 1-based on screen, 0-based here.
fn number(token: &str, len: usize) -> Result<usize> {
    let n: usize = token
        .trim()
        .parse()
        .with_context(|| format!("{token:?} is not a number"))?;
    if n == 0 || n > len {
        bail!("{n} is not between 1 and {len}");
    }
    Ok(n - 1)
}
