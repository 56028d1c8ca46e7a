//! Static knowledge base the chat assistant answers from.

use std::fmt::Write as _;

use crate::domain::Language;

/// Project name used in the prompt.
pub const PROJECT_NAME: &str = "Moliyachi";

/// Public links shared by every language.
pub const LINKS: [(&str, &str); 4] = [
    ("Demo App", "https://moliyachi-web.vercel.app/"),
    ("API Documentation", "https://fast-forward-apty.onrender.com/docs/"),
    ("Landing Page", "https://moliyachi.vercel.app/"),
    ("GitHub Repository", "https://github.com/khasanrashidov/Fast-Forward-AI500"),
];

/// Knowledge base content in one language.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeBase {
    /// One-line pitch.
    pub tagline: &'static str,
    /// What the product is.
    pub what_is: &'static str,
    /// Who it is for.
    pub audience: &'static str,
    /// Heading of the problem section.
    pub problem_title: &'static str,
    /// Problem statement.
    pub problem: &'static str,
    /// Problems addressed.
    pub problems: &'static [&'static str],
    /// Solution statement.
    pub solution: &'static str,
    /// `(feature, description)` pairs.
    pub features: &'static [(&'static str, &'static str)],
}

const FEATURE_TITLES: [&str; 6] = [
    "AI Spending Insights",
    "Smart Monthly Planning",
    "Financial Health Score",
    "Goal Planning",
    "Personalized Recommendations",
    "Agrobank Product Matching",
];

const EN: KnowledgeBase = KnowledgeBase {
    tagline: "Your AI-powered personal finance assistant inside Agrobank Mobile",
    what_is: "Moliyachi (meaning \"Financial Expert\" in Uzbek) is an AI-powered personal finance \
assistant that lives inside Agrobank Mobile. It's not a separate app - it's a smart layer on top of \
your existing banking app that makes your financial data actionable and understandable.",
    audience: "Moliyachi is designed for Agrobank Mobile users in Uzbekistan, including individuals \
and families who want to better understand and manage their finances. It's especially useful for \
those who live on a salary cycle, want to save money, track spending, and achieve financial goals.",
    problem_title: "The Problem",
    problem: "A significant number of Agrobank's customers live on a strict salary cycle, facing \
stress and uncertainty every month",
    problems: &[
        "Aggressive spending after salary arrival",
        "Mid-month financial stress & uncertainty",
        "No visibility into spending behavior",
        "Lack of personalized budgeting guidance",
        "Current banking apps provide transactions, not intelligence",
    ],
    solution: "A smart financial assistant fully embedded into AgrobankMobile that transforms it \
from a transaction tool into a financial partner",
    features: &[
        (FEATURE_TITLES[0], "Short, actionable explanations of where your money goes"),
        (FEATURE_TITLES[1], "Warnings when spending is too fast & balance predictions"),
        (FEATURE_TITLES[2], "One simple score (0-100) explaining your stability"),
        (FEATURE_TITLES[3], "AI calculates timelines and suggests improvements"),
        (FEATURE_TITLES[4], "Based on spending patterns, habits, income, and goals"),
        (FEATURE_TITLES[5], "AI suggests Microloans, Deposits, Savings, and Installment options"),
    ],
};

const UZ: KnowledgeBase = KnowledgeBase {
    tagline: "Agrobank Mobile ichidagi AI asosidagi shaxsiy moliyaviy yordamchingiz",
    what_is: "Moliyachi (o'zbekchada \"Moliya mutaxassisi\") - bu Agrobank Mobile ichida yashaydigan \
AI asosidagi shaxsiy moliyaviy yordamchi. Bu alohida ilova emas - bu mavjud banking ilovangiz ustida \
moliyaviy ma'lumotlarni tushunarli va foydali qiladigan aqlli qatlam.",
    audience: "Moliyachi O'zbekistondagi Agrobank Mobile foydalanuvchilari uchun mo'ljallangan, \
jumladan moliyani yaxshiroq tushunish va boshqarish istagidagi shaxslar va oilalar uchun.",
    problem_title: "Muammo",
    problem: "Agrobank mijozlarining katta qismi qat'iy oylik tsiklida yashaydi va har oy stress \
hamda noaniqlikni boshdan kechiradi",
    problems: &[
        "Oylikdan keyingi agressiv sarf-xarajatlar",
        "Oy o'rtasida moliyaviy stress va noaniqlik",
        "Xarajatlar bo'yicha tushunarli ko'rinishning yo'qligi",
        "Shaxsiylashtirilgan byudjet bo'yicha ko'rsatmalar yetishmasligi",
        "Hozirgi banking ilovalari faqat tranzaksiyalarni ko'rsatadi, intellektni emas",
    ],
    solution: "AgrobankMobile ichiga to'liq integratsiya qilingan aqlli moliyaviy yordamchi, u \
ilovani tranzaksion vositadan moliyaviy hamkor darajasiga ko'taradi",
    features: &[
        (FEATURE_TITLES[0], "Pul qayerga ketayotganini qisqa va aniq izohlar bilan tushuntiradi"),
        (FEATURE_TITLES[1], "Juda tez sarflanish haqida ogohlantirish va balans prognozlari"),
        (FEATURE_TITLES[2], "Barqarorlikni ifodalovchi bitta oddiy ko'rsatkich (0-100)"),
        (FEATURE_TITLES[3], "AI maqsadlar muddatini hisoblab beradi va tavsiyalar beradi"),
        (FEATURE_TITLES[4], "Xarajatlar odatlari, daromad, maqsadlar va xulq-atvor asosida"),
        (FEATURE_TITLES[5], "AI Mikroqarzlar, Depozitlar, Jamg'arma va Bo'lib to'lash mahsulotlarini tavsiya qiladi"),
    ],
};

const RU: KnowledgeBase = KnowledgeBase {
    tagline: "Ваш персональный финансовый ассистент на основе AI внутри Agrobank Mobile",
    what_is: "Moliyachi (в переводе с узбекского \"Финансовый эксперт\") - это персональный \
финансовый помощник на базе ИИ, который живет внутри Agrobank Mobile. Это не отдельное приложение - \
это умный слой поверх вашего банковского приложения, который делает ваши финансовые данные \
понятными и полезными.",
    audience: "Moliyachi разработан для пользователей Agrobank Mobile в Узбекистане, включая людей и \
семьи, которые хотят лучше понимать и управлять своими финансами.",
    problem_title: "Проблема",
    problem: "Значительная часть клиентов Agrobank живёт от зарплаты до зарплаты, испытывая стресс и \
неопределённость каждый месяц",
    problems: &[
        "Агрессивные траты сразу после получения зарплаты",
        "Финансовый стресс и неопределённость в середине месяца",
        "Отсутствие прозрачности в поведении расходов",
        "Недостаток персонализированных рекомендаций по бюджету",
        "Текущие банковские приложения дают транзакции, а не интеллект",
    ],
    solution: "Умный финансовый ассистент, встроенный в AgrobankMobile, который превращает его из \
транзакционного инструмента в финансового партнёра",
    features: &[
        (FEATURE_TITLES[0], "Короткие и практичные объяснения того, куда уходят ваши деньги"),
        (FEATURE_TITLES[1], "Предупреждения при слишком быстрых тратах и прогнозы баланса"),
        (FEATURE_TITLES[2], "Один простой показатель (0-100), отражающий вашу финансовую стабильность"),
        (FEATURE_TITLES[3], "AI рассчитывает сроки достижения целей и предлагает улучшения"),
        (FEATURE_TITLES[4], "На основе ваших привычек, доходов, расходов и целей"),
        (FEATURE_TITLES[5], "AI подбирает Микрозаймы, Депозиты, Накопления и Рассрочки"),
    ],
};

impl KnowledgeBase {
    /// Content for `language`.
    #[must_use]
    pub const fn for_language(language: Language) -> &'static Self {
        match language {
            Language::En => &EN,
            Language::Uz => &UZ,
            Language::Ru => &RU,
        }
    }

    /// Renders the knowledge base as prompt text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "PROJECT: {PROJECT_NAME}");
        let _ = writeln!(text, "TAGLINE: {}\n", self.tagline);
        let _ = writeln!(text, "WHAT IS MOLIYACHI:\n{}\n", self.what_is);
        let _ = writeln!(text, "TARGET AUDIENCE:\n{}\n", self.audience);
        let _ = writeln!(text, "PROBLEM - {}:\n{}", self.problem_title, self.problem);
        for problem in self.problems {
            let _ = writeln!(text, "- {problem}");
        }
        let _ = writeln!(text, "\nSOLUTION - {PROJECT_NAME}:\n{}", self.solution);
        for (title, description) in self.features {
            let _ = writeln!(text, "- {title}: {description}");
        }
        text.push_str("\nLINKS:\n");
        for (label, url) in LINKS {
            let _ = writeln!(text, "- {label}: {url}");
        }
        text
    }
}

/// System prompt for a conversation in `language`.
#[must_use]
pub fn system_prompt(language: Language) -> String {
    format!(
        "You are Moliyachi AI Assistant, a helpful chatbot for the Moliyachi personal finance application.

IMPORTANT RULES:
1. ONLY answer questions based on the knowledge base provided below
2. If you don't know the answer or it's not in the knowledge base, say \"I don't have information about that. Please check our documentation or contact the team.\"
3. Respond in the SAME LANGUAGE the user asks in (English, Uzbek, or Russian)
4. Be concise, friendly, and helpful
5. Never make up information, pricing, dates, or details not provided
6. For technical questions not covered, direct users to the API documentation
7. Use markdown formatting for better readability (bold, lists, etc.)

KNOWLEDGE BASE:
{}
Remember: Only answer from the knowledge base above. Do not hallucinate or make up information.",
        KnowledgeBase::for_language(language).render()
    )
}
