use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parlance_grammar::{ElementDefinition as E, PatternDefinition, SectionDefinition};
use parlance_grammar::{Section, SectionRegistry, Slots, Utterance};
use parlance_skill::{
    ChainError, DispatchConfig, DispatchOutcome, Dispatcher, Output, Preferences, Process,
    RenderedResult, SkillChain, SkillContext, SkillInfo, SkillRegistry, StandardRecognizer,
    enabled_preference_key,
};
use pretty_assertions::assert_eq;
use testresult::TestResult;
use tokio_util::sync::CancellationToken;

struct Lyrics;

struct Song {
    title: String,
    artist: Option<String>,
    verses: Vec<&'static str>,
}

#[async_trait]
impl Process for Lyrics {
    type Data = Song;

    async fn process(&self, _: &Utterance, slots: &Slots) -> Result<Song, ChainError> {
        let title = slots
            .text("song_name")
            .ok_or_else(|| ChainError::processing("no song name"))?;
        match title.to_lowercase().as_str() {
            "bohemian rhapsody" => Ok(Song {
                title: title.to_owned(),
                artist: slots.text("artist").map(str::to_owned),
                verses: vec!["Is this the real life?", "Is this just fantasy?"],
            }),
            _ => Err(ChainError::processing(format!("no lyrics for {title}"))),
        }
    }
}

struct LyricsCard;

impl Output for LyricsCard {
    type Data = Song;

    fn output(&self, song: Song) -> Result<RenderedResult, ChainError> {
        let mut result = RenderedResult::new(song.title, song.verses.join("\n"));
        if let Some(artist) = song.artist {
            result = result.with_item("artist", artist);
        }
        Ok(result)
    }
}

/// Sleeps for `delay`, then reports how many times it ran.
struct Slow {
    delay: Duration,
    runs: Arc<AtomicUsize>,
}

#[async_trait]
impl Process for Slow {
    type Data = usize;

    async fn process(&self, _: &Utterance, _: &Slots) -> Result<usize, ChainError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.runs.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

struct Count;

impl Output for Count {
    type Data = usize;

    fn output(&self, runs: usize) -> Result<RenderedResult, ChainError> {
        Ok(RenderedResult::new("Report", format!("run {runs}")))
    }
}

struct Search;

#[async_trait]
impl Process for Search {
    type Data = String;

    async fn process(&self, utterance: &Utterance, _: &Slots) -> Result<String, ChainError> {
        Ok(utterance.text().to_owned())
    }
}

struct SearchCard;

impl Output for SearchCard {
    type Data = String;

    fn output(&self, query: String) -> Result<RenderedResult, ChainError> {
        Ok(RenderedResult::new("Search", query))
    }
}

struct MissingTemplate;

impl Output for MissingTemplate {
    type Data = String;

    fn output(&self, query: String) -> Result<RenderedResult, ChainError> {
        Err(ChainError::rendering(format!("no template for '{query}'")))
    }
}

fn sections() -> TestResult<Arc<SectionRegistry>> {
    let sections = SectionRegistry::load([
        SectionDefinition::new(
            "lyrics",
            vec![
                PatternDefinition::new(vec![
                    E::literal(["lyrics"]),
                    E::literal(["of"]),
                    E::capture("song_name"),
                ]),
                PatternDefinition::new(vec![
                    E::literal(["play"]),
                    E::capture("song_name"),
                    E::literal(["by"]),
                    E::capture("artist"),
                ]),
            ],
        ),
        SectionDefinition::new(
            "report",
            vec![PatternDefinition::new(vec![
                E::literal(["daily"]),
                E::literal(["report"]),
                E::optional(vec![E::literal(["please"])]),
            ])],
        ),
    ])?;
    Ok(Arc::new(sections))
}

fn registry(delay: Duration, runs: Arc<AtomicUsize>) -> TestResult<SkillRegistry> {
    let mut registry = SkillRegistry::new();
    registry.register(SkillInfo::new("lyrics", "Lyrics", true, |context| {
        let recognizer = StandardRecognizer::new(context.section("lyrics")?);
        Ok(SkillChain::new(recognizer, Lyrics, LyricsCard).into_shared())
    }))?;
    registry.register(SkillInfo::new("report", "Daily report", true, move |context| {
        let recognizer = StandardRecognizer::new(context.section("report")?);
        let processor = Slow {
            delay,
            runs: runs.clone(),
        };
        Ok(SkillChain::new(recognizer, processor, Count).into_shared())
    }))?;
    registry.set_fallback(SkillInfo::new("search", "Search", true, |_| {
        Ok(SkillChain::new(NeverRecognize, Search, SearchCard).into_shared())
    }));
    Ok(registry)
}

struct NeverRecognize;

impl parlance_skill::Recognize for NeverRecognize {
    fn recognize(&self, _: &Utterance) -> parlance_grammar::MatchResult {
        parlance_grammar::MatchResult::none()
    }
}

fn dispatcher(config: DispatchConfig, preferences: Preferences) -> TestResult<Dispatcher> {
    let registry = registry(Duration::ZERO, Arc::default())?;
    let context = SkillContext::new(sections()?).with_preferences(preferences);
    Ok(Dispatcher::from_registry(&registry, &context, config)?)
}

#[test_log::test(tokio::test)]
async fn it_dispatches_to_the_matching_skill() -> TestResult {
    let dispatcher = dispatcher(DispatchConfig::default(), Preferences::new())?;

    let result = dispatcher
        .dispatch("Play Bohemian Rhapsody by Queen")
        .await
        .ok_or("no result")?;

    assert_eq!(
        result,
        RenderedResult::new(
            "Bohemian Rhapsody",
            "Is this the real life?\nIs this just fantasy?"
        )
        .with_item("artist", "Queen")
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_reports_no_match_and_failures() -> TestResult {
    let dispatcher = dispatcher(DispatchConfig::default(), Preferences::new())?;
    let never = CancellationToken::new();

    assert_eq!(
        dispatcher.dispatch_outcome("turn off the lights", &never).await,
        DispatchOutcome::NoMatch
    );
    assert_eq!(dispatcher.dispatch_outcome("", &never).await, DispatchOutcome::NoMatch);

    assert_eq!(
        dispatcher.dispatch_outcome("lyrics of yesterday", &never).await,
        DispatchOutcome::Failed {
            skill_id: "lyrics".into(),
            error: ChainError::ProcessingFailed("no lyrics for yesterday".into()),
        }
    );
    assert!(dispatcher.dispatch("lyrics of yesterday").await.is_none());
    Ok(())
}

#[test_log::test(tokio::test(start_paused = true))]
async fn slow_processing_times_out() -> TestResult {
    let runs = Arc::new(AtomicUsize::new(0));
    let registry = registry(Duration::from_secs(5), runs.clone())?;
    let context = SkillContext::new(sections()?);
    let config = DispatchConfig::default().with_processing_timeout(Duration::from_secs(2));
    let dispatcher = Dispatcher::from_registry(&registry, &context, config)?;

    let outcome = dispatcher
        .dispatch_outcome("daily report", &CancellationToken::new())
        .await;
    assert_eq!(
        outcome,
        DispatchOutcome::Failed {
            skill_id: "report".into(),
            error: ChainError::ProcessingTimedOut(Duration::from_secs(2)),
        }
    );
    // The plain entry point reports a timed-out chain as no result.
    assert_eq!(dispatcher.dispatch("daily report please").await, None);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancellation_abandons_processing() -> TestResult {
    let registry = registry(Duration::from_secs(5), Arc::default())?;
    let dispatcher =
        Dispatcher::from_registry(&registry, &SkillContext::new(sections()?), DispatchConfig::default())?;

    let cancellation = CancellationToken::new();
    let trigger = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    assert_eq!(
        dispatcher.dispatch_outcome("daily report", &cancellation).await,
        DispatchOutcome::Failed {
            skill_id: "report".into(),
            error: ChainError::Cancelled,
        }
    );
    Ok(())
}

#[tokio::test]
async fn disabled_skills_are_never_dispatched() -> TestResult {
    let preferences = Preferences::new().set(enabled_preference_key("lyrics"), false);
    let dispatcher = dispatcher(DispatchConfig::default(), preferences)?;

    assert_eq!(dispatcher.skill_ids().collect::<Vec<_>>(), ["report"]);
    assert_eq!(
        dispatcher
            .dispatch_outcome("play bohemian rhapsody by queen", &CancellationToken::new())
            .await,
        DispatchOutcome::NoMatch
    );
    Ok(())
}

#[tokio::test]
async fn fallback_answers_when_nothing_matches() -> TestResult {
    let dispatcher = dispatcher(DispatchConfig::default(), Preferences::new())?;

    let result = dispatcher
        .dispatch_or_fallback("how tall is mount everest")
        .await
        .ok_or("no fallback result")?;
    assert_eq!(result, RenderedResult::new("Search", "how tall is mount everest"));

    // A matching skill still wins over the fallback.
    let result = dispatcher
        .dispatch_or_fallback("daily report")
        .await
        .ok_or("no result")?;
    assert_eq!(result.title, "Report");

    // Failures fall through to the fallback as well.
    let result = dispatcher
        .dispatch_or_fallback("lyrics of yesterday")
        .await
        .ok_or("no fallback result")?;
    assert_eq!(result.title, "Search");

    // The fallback never takes part in selection.
    assert!(dispatcher.dispatch("how tall is mount everest").await.is_none());
    Ok(())
}

#[tokio::test]
async fn the_threshold_is_configurable() -> TestResult {
    let strict = DispatchConfig::default().with_acceptance_threshold(1.0);
    let dispatcher = dispatcher(strict, Preferences::new())?;

    assert!(dispatcher.select(&Utterance::new("daily report")).is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_are_independent() -> TestResult {
    let runs = Arc::new(AtomicUsize::new(0));
    let registry = registry(Duration::from_millis(10), runs.clone())?;
    let dispatcher = Arc::new(Dispatcher::from_registry(
        &registry,
        &SkillContext::new(sections()?),
        DispatchConfig::default(),
    )?);

    let mut handles = Vec::new();
    for index in 0..16 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            let text = if index % 2 == 0 {
                "daily report"
            } else {
                "play bohemian rhapsody by queen"
            };
            dispatcher.dispatch(text).await
        }));
    }

    let mut titles = Vec::new();
    for handle in handles {
        titles.push(handle.await?.ok_or("no result")?.title);
    }

    assert_eq!(titles.iter().filter(|title| *title == "Report").count(), 8);
    assert_eq!(
        titles.iter().filter(|title| *title == "bohemian rhapsody").count(),
        8
    );
    assert_eq!(runs.load(Ordering::SeqCst), 8);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn rendering_failures_are_reported() -> TestResult {
    let section = Section::compile(&SectionDefinition::new(
        "forecast",
        vec![PatternDefinition::new(vec![
            E::literal(["forecast"]),
            E::literal(["for"]),
            E::capture("city"),
        ])],
    ));
    let chain = SkillChain::new(
        StandardRecognizer::new(Arc::new(section)),
        Search,
        MissingTemplate,
    );
    let dispatcher = Dispatcher::new(DispatchConfig::default()).with_skill("forecast", chain.into_shared());

    assert_eq!(
        dispatcher
            .dispatch_outcome("forecast for rome", &CancellationToken::new())
            .await,
        DispatchOutcome::Failed {
            skill_id: "forecast".into(),
            error: ChainError::RenderingFailed("no template for 'forecast for rome'".into()),
        }
    );
    assert!(dispatcher.dispatch("forecast for rome").await.is_none());
    Ok(())
}
