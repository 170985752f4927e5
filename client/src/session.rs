// src/session.rs

//! The interactive quiz session: login, pick a quiz type, answer until the
//! server closes the flow, show the score.

use std::{
    fmt::Display,
    io::{BufRead, Write},
};

use anyhow::{Context, Result, bail};
use owo_colors::{OwoColorize, Style};

use crate::{
    api::{ApiClient, Joined, Submitted},
    models::{Question, QuizType, Score},
};

pub struct Session<R, W> {
    client: ApiClient,
    input: R,
    out: W,
    color: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(client: ApiClient, input: R, out: W) -> Self {
        Self {
            client,
            input,
            out,
            color: false,
        }
    }

    /// Highlight messages with ANSI colors. Off by default.
    pub fn colored(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn say(&mut self, style: Style, message: impl Display) -> Result<()> {
        if self.color {
            writeln!(self.out, "{}", message.style(style))?;
        } else {
            writeln!(self.out, "{message}")?;
        }
        Ok(())
    }

    pub async fn run(mut self) -> Result<()> {
        self.say(Style::new().cyan().bold(), "Welcome to the quiz!")?;
        self.say(Style::new().cyan(), "=".repeat(40))?;

        let username = self.prompt_username()?;
        self.client
            .login(&username)
            .await
            .context("login failed")?;
        self.say(Style::new().green(), format!("Logged in as {username}."))?;

        loop {
            let types = self.client.quiz_types().await?;
            if types.is_empty() {
                self.say(Style::new().yellow(), "No quiz types available.")?;
                return Ok(());
            }

            let quiz_type = match self.prompt_quiz_type(&types)? {
                Some(name) => name,
                None => continue,
            };

            match self.client.join_quiz(&quiz_type).await? {
                Joined::New => {
                    self.say(Style::new().green(), format!("Joined quiz: {quiz_type}"))?
                }
                Joined::Existing => {
                    self.say(Style::new().green(), format!("Resuming quiz: {quiz_type}"))?
                }
            }

            self.question_loop(&quiz_type).await?;

            let score = self.client.score(&quiz_type).await?;
            self.print_score(&score)?;

            if !self.prompt_yes_no("Do you want to try another quiz type? (Y/N): ")? {
                self.say(Style::new().cyan(), "Thank you for playing! Goodbye.")?;
                return Ok(());
            }
        }
    }

    async fn question_loop(&mut self, quiz_type: &str) -> Result<()> {
        while let Some(question) = self.client.next_question(quiz_type).await? {
            self.print_question(&question)?;
            let answer = self.prompt_answer(&question)?;

            match self
                .client
                .submit_answer(quiz_type, &question.id, &answer)
                .await?
            {
                Submitted::Recorded(history) if history.is_correct() => {
                    self.say(Style::new().green(), "Your answer is right :)")?;
                }
                Submitted::Recorded(history) => {
                    self.say(
                        Style::new().red(),
                        format!(
                            "Your answer is wrong :( The right one is {}.",
                            history.expected_answer
                        ),
                    )?;
                }
                Submitted::AlreadyAnswered => {
                    self.say(
                        Style::new().yellow(),
                        "You already answered this question. Moving on...",
                    )?;
                }
            }
        }

        writeln!(self.out)?;
        self.say(Style::new().yellow(), "No more questions. The quiz is finished.")?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    fn prompt_username(&mut self) -> Result<String> {
        loop {
            write!(self.out, "Enter your username: ")?;
            self.out.flush()?;
            let name = self.read_line()?;
            if !name.is_empty() {
                return Ok(name);
            }
        }
    }

    /// `None` on an invalid selection.
    fn prompt_quiz_type(&mut self, types: &[QuizType]) -> Result<Option<String>> {
        writeln!(self.out, "\nAvailable quiz types:")?;
        for (i, t) in types.iter().enumerate() {
            writeln!(
                self.out,
                "  {}) {} ({} questions)",
                i + 1,
                t.name,
                t.question_ids.len()
            )?;
        }
        write!(self.out, "Select a quiz type by number: ")?;
        self.out.flush()?;

        let input = self.read_line()?;
        match input.parse::<usize>() {
            Ok(n) if (1..=types.len()).contains(&n) => Ok(Some(types[n - 1].name.clone())),
            _ => {
                self.say(Style::new().red(), format!("Invalid selection: {input}"))?;
                Ok(None)
            }
        }
    }

    fn print_question(&mut self, question: &Question) -> Result<()> {
        writeln!(self.out, "\nQuestion ({})", question.id)?;
        writeln!(self.out, "{}", question.prompt)?;
        for option in &question.options {
            writeln!(self.out, "  {option}")?;
        }
        Ok(())
    }

    fn prompt_answer(&mut self, question: &Question) -> Result<String> {
        let valid = answer_letters(question.options.len());
        loop {
            write!(self.out, "Your answer ({}): ", valid.join(", "))?;
            self.out.flush()?;

            let input = self.read_line()?;
            if valid.is_empty() {
                // Free-text answers are compared verbatim.
                if !input.is_empty() {
                    return Ok(input);
                }
                continue;
            }

            let input = input.to_uppercase();
            if valid.contains(&input) {
                return Ok(input);
            }
            self.say(
                Style::new().red(),
                format!(
                    "Invalid answer: {input}. Please enter one of {}.",
                    valid.join(", ")
                ),
            )?;
        }
    }

    fn prompt_yes_no(&mut self, prompt: &str) -> Result<bool> {
        loop {
            write!(self.out, "{prompt}")?;
            self.out.flush()?;
            match self.read_line()?.to_uppercase().as_str() {
                "Y" | "YES" => return Ok(true),
                "N" | "NO" => return Ok(false),
                _ => self.say(Style::new().red(), "Please answer Y or N.")?,
            }
        }
    }

    fn print_score(&mut self, score: &Score) -> Result<()> {
        let flow = &score.user_quiz;
        let banner = Style::new().magenta().bold();
        self.say(banner, "=".repeat(40))?;
        self.say(banner, format!("{:^40}", "FINAL SCORE"))?;
        self.say(banner, "=".repeat(40))?;
        writeln!(self.out, "Quiz type        : {}", flow.quiz_type)?;
        writeln!(self.out, "Answered         : {} questions", flow.history_ids.len())?;
        writeln!(self.out, "Accuracy         : {:.2}%", flow.accuracy_rate * 100.0)?;
        match score.cohort_accuracy {
            Some(avg) => writeln!(
                self.out,
                "Average accuracy : {:.2}% over {} finished quizzes",
                avg * 100.0,
                score.cohort_size
            )?,
            None => writeln!(self.out, "Average accuracy : not enough data yet")?,
        }
        if let Some(closed_at) = &flow.closed_at {
            writeln!(self.out, "Quiz closed at   : {closed_at}")?;
        }
        self.say(banner, "=".repeat(40))?;
        Ok(())
    }
}

/// `A`, `B`, ... one letter per option.
fn answer_letters(options: usize) -> Vec<String> {
    (b'A'..=b'Z')
        .take(options)
        .map(|c| char::from(c).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use url::Url;

    use super::*;

    fn session(input: &str) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        let client = ApiClient::new(Url::parse("http://localhost:1/").unwrap()).unwrap();
        Session::new(client, Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn question(options: usize) -> Question {
        Question {
            id: "q1".to_string(),
            prompt: "?".to_string(),
            options: answer_letters(options),
        }
    }

    #[test]
    fn letters_follow_option_count() {
        assert_eq!(answer_letters(3), vec!["A", "B", "C"]);
        assert!(answer_letters(0).is_empty());
    }

    #[test]
    fn answer_prompt_retries_until_valid() {
        let mut s = session("e\n\nb\n");
        assert_eq!(s.prompt_answer(&question(4)).unwrap(), "B");

        let out = String::from_utf8(s.out).unwrap();
        assert!(out.contains("Invalid answer: E"));
    }

    #[test]
    fn free_answer_keeps_its_case() {
        let mut s = session("\nParis\n");
        assert_eq!(s.prompt_answer(&question(0)).unwrap(), "Paris");

        let out = String::from_utf8(s.out).unwrap();
        assert!(!out.contains("Invalid answer"));
    }

    #[test]
    fn option_letters_are_case_insensitive() {
        let mut s = session("c\n");
        assert_eq!(s.prompt_answer(&question(4)).unwrap(), "C");
    }

    #[test]
    fn messages_are_colored_only_when_enabled() {
        let mut plain = session("");
        plain.say(Style::new().red(), "Invalid selection: 9").unwrap();
        assert_eq!(String::from_utf8(plain.out).unwrap(), "Invalid selection: 9\n");

        let mut colored = session("").colored(true);
        colored.say(Style::new().red(), "Invalid selection: 9").unwrap();
        let out = String::from_utf8(colored.out).unwrap();
        assert!(out.starts_with("\u{1b}["));
        assert!(out.contains("Invalid selection: 9"));
        assert!(out.ends_with("\u{1b}[0m\n"));
    }

    #[test]
    fn quiz_type_selection() {
        let types = vec![
            QuizType {
                name: "geo".into(),
                question_ids: vec![],
            },
            QuizType {
                name: "math".into(),
                question_ids: vec![],
            },
        ];

        let mut s = session("2\n3\nx\n");
        assert_eq!(s.prompt_quiz_type(&types).unwrap().as_deref(), Some("math"));
        assert_eq!(s.prompt_quiz_type(&types).unwrap(), None);
        assert_eq!(s.prompt_quiz_type(&types).unwrap(), None);
    }

    #[test]
    fn yes_no_prompt() {
        let mut s = session("maybe\nyes\nN\n");
        assert!(s.prompt_yes_no("? ").unwrap());
        assert!(!s.prompt_yes_no("? ").unwrap());
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut s = session("");
        assert!(s.prompt_username().is_err());
    }
}
