use crate::engine::EmptyReason;
use crate::localization::Localizer;
use crate::types::LocalizedContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Welcome,
    NoCategoriesExist,
    NoCategoriesSelected,
    NoCandidates,
    ChooseCategories,
    ShowAffirmation,
    LanguageSet,
    SelectedCategories,
    LastShown,
    Never,
    NothingSelected,
    TryAgain,
}

impl From<EmptyReason> for MessageKey {
    fn from(reason: EmptyReason) -> Self {
        match reason {
            EmptyReason::NoCategoriesExist => MessageKey::NoCategoriesExist,
            EmptyReason::NoCategoriesSelected => MessageKey::NoCategoriesSelected,
            EmptyReason::NoCandidates => MessageKey::NoCandidates,
        }
    }
}

fn catalog(key: MessageKey) -> LocalizedContent {
    let (en, es) = match key {
        MessageKey::Welcome => (
            "🌅 Welcome! Every day you get one affirmation from the categories you choose.\n\
             \n ✨ Use /affirmation to see today's affirmation.\
             \n 🗂 Use /categories to choose what you want to hear about.\
             \n 🌐 Use /language <code> to change the language (en, es).\
             \n ⚙️ Use /preferences to review your settings.",
            "🌅 ¡Bienvenido! Cada día recibes una afirmación de las categorías que elijas.\n\
             \n ✨ Usa /affirmation para ver la afirmación de hoy.\
             \n 🗂 Usa /categories para elegir los temas.\
             \n 🌐 Usa /language <código> para cambiar el idioma (en, es).\
             \n ⚙️ Usa /preferences para revisar tu configuración.",
        ),
        MessageKey::NoCategoriesExist => (
            "There are no affirmation categories yet. Please check back later.",
            "Todavía no hay categorías de afirmaciones. Vuelve a intentarlo más tarde.",
        ),
        MessageKey::NoCategoriesSelected => (
            "You haven't selected any categories. Use /categories to choose some.",
            "No has seleccionado ninguna categoría. Usa /categories para elegir.",
        ),
        MessageKey::NoCandidates => (
            "There are no affirmations in your selected categories yet. Try /categories to pick others.",
            "Aún no hay afirmaciones en tus categorías. Prueba /categories para elegir otras.",
        ),
        MessageKey::ChooseCategories => (
            "Choose the categories for your daily affirmation:",
            "Elige las categorías de tu afirmación diaria:",
        ),
        MessageKey::ShowAffirmation => ("✨ Show today's affirmation", "✨ Ver la afirmación de hoy"),
        MessageKey::LanguageSet => ("✅ Language set to", "✅ Idioma cambiado a"),
        MessageKey::SelectedCategories => ("Selected categories", "Categorías seleccionadas"),
        MessageKey::LastShown => ("Last affirmation", "Última afirmación"),
        MessageKey::Never => ("Never", "Nunca"),
        MessageKey::NothingSelected => ("none", "ninguna"),
        MessageKey::TryAgain => (
            "Sorry, something went wrong. Please try again in a few moments.",
            "Lo sentimos, algo salió mal. Inténtalo de nuevo en unos momentos.",
        ),
    };
    LocalizedContent::new().with("en", en).with("es", es)
}

pub fn text(key: MessageKey, localizer: &Localizer) -> String {
    localizer.text(&catalog(key))
}
