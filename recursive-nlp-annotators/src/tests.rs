//! Integration tests: full annotator pipelines against the in-memory engine.

use std::sync::Arc;

use recursive_nlp::testing::RecordingEngine;
use recursive_nlp::{
    ExternalResource, ReadAs, RecursivePipeline, RecursivePipelineModel, Session, Stage,
};

use crate::{DocumentAssembler, Finisher, Lemmatizer, NerConverter, RegexTokenizer};

fn session() -> (Session, Arc<RecordingEngine>) {
    let engine = Arc::new(RecordingEngine::new());
    let session = Session::builder(engine.clone()).app_name("annotator-tests").build();
    (session, engine)
}

#[test]
fn typical_pipeline_fits_and_transforms() {
    let (session, engine) = session();
    let dictionary = ExternalResource::new("lemmas.txt", ReadAs::LineByLine);

    let pipeline = RecursivePipeline::new()
        .add_stage(DocumentAssembler::new(&session).unwrap())
        .add_stage(RegexTokenizer::new(&session).unwrap())
        .add_stage(Lemmatizer::new(&session).unwrap().set_dictionary(&dictionary))
        .add_stage(Finisher::new(&session).unwrap().set_input_cols(&["lemma"]));
    assert_eq!(pipeline.last_estimator_index(), Some(2));

    let fitted = pipeline.fit(&engine.dataset()).unwrap();
    assert_eq!(fitted.len(), 4);
    // the lemmatizer saw the two stages executed before it
    assert_eq!(engine.recursive_fit_contexts(), vec![2]);

    let model = RecursivePipelineModel::from(fitted);
    model.transform(&engine.dataset()).unwrap();
    // at transform time the fitted lemmatizer replays the pipeline minus itself
    assert_eq!(engine.recursive_transform_contexts(), vec![3]);
}

#[test]
fn ner_post_processing_stages_pass_through_after_the_last_estimator() {
    let (session, engine) = session();
    let converter = NerConverter::new(&session).unwrap();
    let converter_uid = converter.model().uid().to_string();

    let pipeline = RecursivePipeline::new()
        .add_stage(DocumentAssembler::new(&session).unwrap())
        .add_stage(RegexTokenizer::new(&session).unwrap())
        .add_stage(converter)
        .add_stage(Finisher::new(&session).unwrap());

    // all transformers: nothing to fit, stage list passes through
    let fitted = pipeline.fit(&engine.dataset()).unwrap();
    assert_eq!(fitted.len(), 4);
    assert_eq!(engine.fit_count(), 0);
    assert_eq!(engine.transform_count_for(&converter_uid), 0);
}

#[test]
fn pipeline_display_names_every_stage() {
    let (session, _engine) = session();
    let fitted = RecursivePipeline::new()
        .add_stage(DocumentAssembler::new(&session).unwrap())
        .add_stage(RegexTokenizer::new(&session).unwrap())
        .fit(&recursive_nlp::Dataset::new(0))
        .unwrap();

    insta::assert_snapshot!(
        fitted.to_string(),
        @"PipelineModel[transformer:DocumentAssembler_0 -> transformer:RegexTokenizer_1]"
    );
}

#[test]
fn lazy_finisher_is_skipped_during_replay() {
    let (session, engine) = session();
    let assembler = DocumentAssembler::new(&session).unwrap();
    let finisher = Finisher::new(&session).unwrap();
    let finisher_uid = finisher.model().uid().to_string();
    let lazy_stage = match Stage::from(finisher) {
        Stage::Transformer(model) => Stage::from(model.set_lazy_annotator(true)),
        other => other,
    };

    let fitted = RecursivePipeline::new()
        .add_stage(assembler)
        .add_stage(lazy_stage)
        .fit(&engine.dataset())
        .unwrap();

    RecursivePipelineModel::from(fitted)
        .transform(&engine.dataset())
        .unwrap();
    assert_eq!(engine.transform_count_for(&finisher_uid), 0);
}
