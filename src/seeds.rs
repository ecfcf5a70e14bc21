//! Built-in question bank that keeps the quiz playable without remote
//! services or a TOML bank.

use crate::config::{BankAnswer, BankQuestion};
use crate::domain::Category;

struct SeedQuestion {
  prompt: &'static str,
  reward: u32,
  answers: [&'static str; 3],
  correct: usize,
}

struct SeedCategory {
  id: u64,
  difficulty: u32,
  name: &'static str,
  questions: [SeedQuestion; 5],
}

const fn q(prompt: &'static str, reward: u32, answers: [&'static str; 3], correct: usize) -> SeedQuestion {
  SeedQuestion { prompt, reward, answers, correct }
}

const SEED_BANK: [SeedCategory; 3] = [
  SeedCategory {
    id: 1,
    difficulty: 1,
    name: "General knowledge",
    questions: [
      q("How many days are in a leap year?", 100, ["365", "366", "364"], 1),
      q("Which planet is known as the Red Planet?", 200, ["Mars", "Venus", "Jupiter"], 0),
      q("What is the largest ocean on Earth?", 300, ["Atlantic", "Indian", "Pacific"], 2),
      q("How many continents are there?", 500, ["Seven", "Five", "Six"], 0),
      q("What gas do plants absorb from the air?", 1000, ["Oxygen", "Carbon dioxide", "Nitrogen"], 1),
    ],
  },
  SeedCategory {
    id: 2,
    difficulty: 2,
    name: "Geography",
    questions: [
      q("What is the capital of Australia?", 2000, ["Sydney", "Canberra", "Melbourne"], 1),
      q("Which river flows through Cairo?", 4000, ["Nile", "Tigris", "Congo"], 0),
      q("Mount Kilimanjaro is located in which country?", 8000, ["Kenya", "Uganda", "Tanzania"], 2),
      q("Which country has the most islands?", 16000, ["Sweden", "Indonesia", "Philippines"], 0),
      q("What is the smallest country by area?", 32000, ["Monaco", "Vatican City", "San Marino"], 1),
    ],
  },
  SeedCategory {
    id: 3,
    difficulty: 3,
    name: "Science",
    questions: [
      q("What is the chemical symbol for tungsten?", 64000, ["W", "Tu", "Tg"], 0),
      q("Which particle carries no electric charge?", 125000, ["Proton", "Electron", "Neutron"], 2),
      q("What is the hardest natural mineral?", 250000, ["Quartz", "Diamond", "Topaz"], 1),
      q("How many bones are in the adult human body?", 500000, ["206", "212", "198"], 0),
      q("Who proposed the theory of general relativity?", 1000000, ["Newton", "Bohr", "Einstein"], 2),
    ],
  },
];

/// Seed categories and their questions. Question ids are `category * 100 + n`,
/// answer ids `question * 10 + n`.
pub fn seed_bank() -> (Vec<Category>, Vec<BankQuestion>) {
  let mut categories = Vec::with_capacity(SEED_BANK.len());
  let mut questions = Vec::new();

  for cat in &SEED_BANK {
    categories.push(Category {
      id: cat.id,
      difficulty: cat.difficulty,
      name: cat.name.to_string(),
      description: None,
    });

    for (qi, sq) in cat.questions.iter().enumerate() {
      let qid = cat.id * 100 + qi as u64 + 1;
      let answers = sq
        .answers
        .iter()
        .enumerate()
        .map(|(ai, text)| BankAnswer { id: qid * 10 + ai as u64 + 1, text: text.to_string(), correct: ai == sq.correct })
        .collect();
      questions.push(BankQuestion { id: qid, category_id: cat.id, prompt: sq.prompt.to_string(), reward: sq.reward, answers });
    }
  }

  (categories, questions)
}
