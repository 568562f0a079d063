#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Letter(char),
    /// Word boundary, typed with a literal space.
    Space,
}

impl Token {
    pub fn expected(self) -> char {
        match self {
            Token::Letter(ch) => ch,
            Token::Space => ' ',
        }
    }

    pub fn is_space(self) -> bool {
        matches!(self, Token::Space)
    }
}

/// One character per token, fixed once generated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LessonText {
    tokens: Vec<Token>,
}

impl LessonText {
    pub fn new(text: &str) -> Self {
        let tokens = text
            .chars()
            .map(|ch| if ch == ' ' { Token::Space } else { Token::Letter(ch) })
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn word_boundaries(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_space()).count()
    }

    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            Token::Letter(ch) => Some(*ch),
            Token::Space => None,
        })
    }
}

impl std::fmt::Display for LessonText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token.expected())?;
        }
        Ok(())
    }
}
