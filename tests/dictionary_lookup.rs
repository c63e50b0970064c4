use steno_core::core::lesson::progress_lesson;
use steno_core::config::FamiliaritySelection;
use steno_core::dictionary::{LayeredDictionary, Misstrokes, Namespace};
use steno_core::FamiliarityStore;

fn layered() -> LayeredDictionary {
    let mut dictionary = LayeredDictionary::new();
    dictionary.add_dictionary("main.json", Namespace::Builtin, [("KAT", "cat"), ("-T", "the"), ("TKOG", "dog")]);
    dictionary.add_dictionary("top-10000.json", Namespace::ThirdParty, [("KAT/-S", "cats")]);
    dictionary.add_dictionary("user.json", Namespace::User, [("KA*T", "cat")]);
    dictionary
}

#[test]
fn user_outline_ranks_first_for_cat() {
    let result = layered().lookup("cat");
    let outlines: Vec<&str> = result.candidates.iter().map(|c| c.outline.as_str()).collect();
    assert_eq!(outlines, vec!["KA*T", "KAT"]);
    assert_eq!(result.candidates[0].dictionary, "user.json");
}

#[test]
fn misstroke_filter_leaves_user_entries() {
    let misstrokes: Misstrokes = [("KA*T", "cat"), ("KAT", "cat")].into_iter().collect();
    let result = layered().lookup("cat").without_misstrokes(&misstrokes);
    let outlines: Vec<&str> = result.candidates.iter().map(|c| c.outline.as_str()).collect();
    assert_eq!(outlines, vec!["KA*T"]);
}

#[test]
fn progress_lesson_uses_dictionary_outlines() {
    let met: FamiliarityStore = [("dog".to_string(), 3), (" cat".to_string(), 5), ("zzz".to_string(), 1)].into_iter().collect();
    let selection = FamiliaritySelection { new_words: false, seen_words: true, retained_words: true };
    let lesson = progress_lesson(&met, &layered(), &selection).unwrap();
    assert_eq!(lesson.title, "Your words");
    let items: Vec<(&str, &str)> = lesson.source_material.iter().map(|i| (i.phrase.as_str(), i.stroke.as_str())).collect();
    assert_eq!(items, vec![("cat", "KA*T"), ("dog", "TKOG"), ("zzz", "xxx/xxx/xxx")]);

    assert!(progress_lesson(&FamiliarityStore::new(), &layered(), &selection).is_none());
}
