//! Instructions sent to the external text-generation service.
//!
//! The day-line grammar is stated once in `grammar_rules()` and shared by
//! every prompt so the service and the local decoder agree on it.

use crate::calendar::{days_in_month, month_title};
use crate::error::CodecError;

/// The annotated day-line grammar, as instructions.
pub fn grammar_rules() -> &'static str {
    "DAY-LINE FORMAT:\n\
     - First line: the full month name and 4-digit year (e.g. \"February 2026\"), then a blank line.\n\
     - Then exactly one line per calendar day, in date order:\n\
       \"<Wkd> <Mon> <Day><suffix> - <entries>\" (e.g. \"Mon Feb 2nd - DESIGN, AWARD\").\n\
     - <Wkd> is Sun, Mon, Tue, Wed, Thu, Fri or Sat. <Mon> is Jan..Dec.\n\
     - <suffix> is st for 1, 21, 31; nd for 2, 22; rd for 3, 23; th otherwise.\n\
     - A day with no activities reads \"<Wkd> <Mon> <Day><suffix> - empty\".\n\
     - Entries are activity names separated by \", \", in top-to-bottom order.\n\
     - When one colored block spans several consecutive days, append the same merge code\n\
       in parentheses to that activity on every day of the block: \"DESIGN (A1)\".\n\
       Codes are a capital letter and a number: A1, B1, ... Z1, A2. Give each block its own code.\n\
     - Activities that occupy a single day get no code.\n"
}

/// Calendar image(s) → day-line text.
pub fn build_recognition_prompt(year: i32, month: u32) -> Result<String, CodecError> {
    let title = month_title(year, month)?;
    let day_count = days_in_month(year, month)?;

    let mut prompt = String::with_capacity(2048);
    prompt.push_str(&format!(
        "You are transcribing a production calendar for {title} from the attached image(s).\n\n"
    ));
    prompt.push_str(
        "Each day cell holds zero or more colored stripes, each labelled with an activity name. \
         A stripe that visually continues into the next day's cell is one block.\n\n",
    );
    prompt.push_str(grammar_rules());
    prompt.push_str(&format!(
        "\nWrite all {day_count} days of {title}. Copy activity names exactly as printed.\n\
         Return ONLY the day-line text. Do NOT return JSON. No commentary before or after.\n"
    ));
    Ok(prompt)
}

/// Day-line text → JSON schedule.
pub fn build_decode_prompt(text: &str, year: i32, month: u32) -> Result<String, CodecError> {
    let title = month_title(year, month)?;

    let mut prompt = String::with_capacity(2048 + text.len());
    prompt.push_str(&format!(
        "Convert this {title} production schedule into JSON.\n\n"
    ));
    prompt.push_str(grammar_rules());
    prompt.push_str(
        "\nCONVERSION RULES:\n\
         - The first time a merge code appears, that stripe has \"mergeWithPrevious\": false.\n\
         - Every later appearance of the same code has \"mergeWithPrevious\": true.\n\
         - Entries without a code always have \"mergeWithPrevious\": false.\n\
         - Drop the code from the activity name.\n\
         - \"empty\" days have an empty stripes array.\n\n",
    );
    prompt.push_str(&json_output_instructions());
    prompt.push_str("\nSCHEDULE:\n");
    prompt.push_str(text.trim());
    prompt.push('\n');
    Ok(prompt)
}

/// Free-text description → JSON schedule.
pub fn build_generation_prompt(
    description: &str,
    year: i32,
    month: u32,
) -> Result<String, CodecError> {
    let title = month_title(year, month)?;

    let mut prompt = String::with_capacity(2048 + description.len());
    prompt.push_str(&format!(
        "Build a production schedule for {title} from the description below.\n\
         Only include days the description mentions. Use short upper-case activity names.\n\
         When an activity runs across consecutive days, emit it on each day and set \
         \"mergeWithPrevious\": true on every day after the first.\n\n"
    ));
    prompt.push_str(&json_output_instructions());
    prompt.push_str("\nDESCRIPTION:\n");
    prompt.push_str(description.trim());
    prompt.push('\n');
    Ok(prompt)
}

fn json_output_instructions() -> String {
    "Return ONLY a JSON array — no other text before or after.\n\
     The JSON must conform exactly to this schema:\n\n\
     ```json\n\
     [\n\
       {\"date\": \"YYYY-MM-DD\", \"stripes\": [\n\
         {\"activity\": \"NAME\", \"mergeWithPrevious\": false}\n\
       ]}\n\
     ]\n\
     ```\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_prompt_names_month() {
        let prompt = build_recognition_prompt(2026, 2).unwrap();
        assert!(prompt.contains("February 2026"));
        assert!(prompt.contains("all 28 days"));
        assert!(prompt.contains("Do NOT return JSON"));
        assert!(prompt.contains("DAY-LINE FORMAT"));
    }

    #[test]
    fn test_decode_prompt_embeds_text() {
        let prompt = build_decode_prompt("  Mon Feb 2nd - DESIGN (A1)\n", 2026, 2).unwrap();
        assert!(prompt.ends_with("SCHEDULE:\nMon Feb 2nd - DESIGN (A1)\n"));
        assert!(prompt.contains("\"mergeWithPrevious\": true"));
    }

    #[test]
    fn test_generation_prompt_rejects_bad_month() {
        assert!(build_generation_prompt("shoot all week", 2026, 13).is_err());
    }
}
