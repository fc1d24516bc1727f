use regex::Regex;
use std::sync::LazyLock;

const PATIENT_PREFIX: &str = "Patient: ";

/// Start of the next speaker turn.
static TURN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:Physician|Patient):").expect("turn pattern is valid"));

/// Everything the patient says, as one line of text.
///
/// Each `Patient: ` turn runs until the next `Physician:`/`Patient:` line or
/// the end of the transcript. Turns are trimmed, inner newlines become
/// spaces, and turns are joined with a single space. `None` when the
/// patient never speaks.
pub fn patient_dialogue(transcript: &str) -> Option<String> {
    let mut turns = Vec::new();
    let mut pos = 0;

    while let Some(found) = transcript[pos..].find(PATIENT_PREFIX) {
        let body_start = pos + found + PATIENT_PREFIX.len();
        let rest = &transcript[body_start..];
        let body_len = TURN_BREAK.find(rest).map_or(rest.len(), |m| m.start());

        let turn = rest[..body_len].trim().replace('\n', " ");
        if !turn.is_empty() {
            turns.push(turn);
        }
        pos = body_start + body_len;
    }

    if turns.is_empty() {
        None
    } else {
        Some(turns.join(" "))
    }
}

/// Consultation used when a request carries no transcript.
pub const SAMPLE_TRANSCRIPT: &str = "\
Physician: Good morning, Ms. Jones. How are you feeling today?
Patient: Good morning, doctor. I’m doing better, but I still have some discomfort now and then.
Physician: I understand you were in a car accident last September. Can you walk me through what happened?
Patient: Yes, it was on September 1st, around 12:30 in the afternoon. I was driving from Cheadle Hulme to Manchester when I had to stop in traffic. Out of nowhere, another car hit me from behind, which pushed my car into the one in front.
Physician: That sounds like a strong impact. Were you wearing your seatbelt?
Patient: Yes, I always do.
Physician: What did you feel immediately after the accident?
Patient: At first, I was just shocked. But then I realized I had hit my head on the steering wheel, and I could feel pain in my neck and back almost right away.
Physician: Did you seek medical attention at that time?
Patient: Yes, I went to Moss Bank Accident and Emergency. They said it was a whiplash injury. They gave me advice and sent me home.
Physician: How did things progress after that?
Patient: The first four weeks were rough. My neck and back pain were really bad—I had trouble sleeping and had to take painkillers. It started improving after that, but I had ten physiotherapy sessions to help with the stiffness.
Physician: Are you still experiencing pain now?
Patient: It’s not constant, but I do get occasional backaches.
Physician: Any emotional effects?
Patient: No, I don’t feel nervous driving or have emotional issues.
Physician: Has this impacted your daily life or work?
Patient: I took a week off work, but then returned to normal.
Physician: Everything looks good physically. No lasting damage.
Patient: That’s a relief.
Physician: You’ll make a full recovery within six months. No long-term impact expected.
Patient: That’s great to hear.
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_patient_turns() {
        let transcript = "Physician: How are you?\nPatient: Better.\nPhysician: Pain?\nPatient: Only\nsometimes.\n";
        assert_eq!(
            patient_dialogue(transcript).as_deref(),
            Some("Better. Only sometimes.")
        );
    }

    #[test]
    fn test_no_patient_turns() {
        assert_eq!(patient_dialogue("Physician: Hello?\nPhysician: Anyone?"), None);
        assert_eq!(patient_dialogue(""), None);
    }

    #[test]
    fn test_sample_transcript() {
        let dialogue = patient_dialogue(SAMPLE_TRANSCRIPT).unwrap();
        assert!(dialogue.starts_with("Good morning, doctor."));
        assert!(dialogue.ends_with("That’s great to hear."));
        assert!(!dialogue.contains("Physician:"));
    }
}
