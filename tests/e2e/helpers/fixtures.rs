use sozo_tutor::domain::dialogue::{DialogueScript, DialogueTurn, KeyPhrase, Lesson, Role};

pub const STAFF_OPENING: &str = "Would you like to try our aromatherapy treatment?";
pub const CUSTOMER_REPLY: &str = "That sounds lovely. How long does it take?";
pub const STAFF_ANSWER: &str = "It takes about sixty minutes.";
pub const CUSTOMER_CLOSING: &str = "Great, I will book it for tomorrow.";

fn spa_turns() -> Vec<DialogueTurn> {
    vec![
        DialogueTurn::new(Role::Staff, STAFF_OPENING, "アロマトリートメントはいかがですか？", 1),
        DialogueTurn::new(
            Role::Customer,
            CUSTOMER_REPLY,
            "素敵ですね。どのくらいかかりますか？",
            2,
        ),
        DialogueTurn::new(Role::Staff, STAFF_ANSWER, "約60分です。", 3),
        DialogueTurn::new(Role::Customer, CUSTOMER_CLOSING, "では明日予約します。", 4),
    ]
}

/// Staff, customer, staff, customer.
pub fn four_turn_script() -> DialogueScript {
    DialogueScript::new(spa_turns()).unwrap()
}

/// Customer first, then the staff learner.
pub fn customer_first_script() -> DialogueScript {
    DialogueScript::new(vec![
        DialogueTurn::new(
            Role::Customer,
            "Excuse me, do you have a sauna?",
            "サウナはありますか？",
            1,
        ),
        DialogueTurn::new(
            Role::Staff,
            "Yes, it is on the second floor.",
            "はい、2階にございます。",
            2,
        ),
    ])
    .unwrap()
}

pub fn spa_lesson() -> Lesson {
    Lesson {
        id: "spa-treatment".to_string(),
        title: "Recommending a treatment".to_string(),
        description: Some("Suggest a treatment and answer questions about it.".to_string()),
        level: Some("beginner".to_string()),
        key_phrase: Some(KeyPhrase {
            english: STAFF_OPENING.to_string(),
            japanese: "アロマトリートメントはいかがですか？".to_string(),
        }),
        dialogue_turns: spa_turns(),
    }
}
