// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use beast_objects::{specs, BeastGraph, BeastObject, Input, ObjectId, ObjectKind, Primitive};
use lphy_beast::{
    operator_weight, BeastContext, GeneratorToBeast, McmcRun, McmcRunner, Options, PluginFactory,
    TranslationError, TranslatorPlugin, TranslatorRegistry, ValueToBeast,
};
use model_graph::{
    Alignment, Context, GeneratorId, GeneratorKind, ModelDocument, ModelGraph, NodeRef, TimeTree,
    Value,
};
use regex::Regex;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

const YULE_JC: &str = include_str!("inputs/yule_jc.toml");

fn yule_jc() -> ModelGraph {
    ModelDocument::from_toml(YULE_JC).unwrap().into_graph().unwrap()
}

fn context(graph: &ModelGraph) -> BeastContext<'_> {
    BeastContext::new(graph, Rc::new(TranslatorRegistry::standard()), Options::default())
}

fn ids(objects: &BeastGraph, list: &[ObjectId]) -> Vec<String> {
    list.iter().map(|o| objects.id_of(*o).to_string()).collect()
}

fn object_input(objects: &BeastGraph, object: ObjectId, name: &str) -> ObjectId {
    match objects.get(object).input(name) {
        Some(Input::Object(id)) => *id,
        other => panic!("`{}` is not an object input: {:?}", name, other),
    }
}

fn real_input(objects: &BeastGraph, object: ObjectId, name: &str) -> f64 {
    match objects.get(object).input(name) {
        Some(Input::Value(Primitive::Real(x))) => *x,
        other => panic!("`{}` is not a real input: {:?}", name, other),
    }
}

#[test]
fn test_yule_jukes_cantor_scenario() {
    let graph = yule_jc();
    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(10_000, 100, "yule_jc").unwrap();
    let objects = ctx.objects();

    assert_eq!(ids(objects, &run.state_nodes), vec!["psi", "lambda"]);
    assert_eq!(
        ids(objects, &run.operators),
        vec![
            "lambda.scale",
            "psi.narrowExchange",
            "psi.scale",
            "psi.subtreeSlide",
            "psi.uniform",
            "psi.wideExchange",
        ]
    );
    assert_eq!(ids(objects, &run.posterior.priors), vec!["lambda.prior", "psi.prior"]);
    assert_eq!(ids(objects, &run.posterior.likelihoods), vec!["D.treeLikelihood"]);
    assert_eq!(
        ids(objects, &run.loggers),
        vec!["screenlog", "tracelog", "psi.treeLogger"]
    );
    assert_eq!(
        objects.get(run.loggers[2]).input("fileName"),
        Some(&Input::Value(Primitive::Text("yule_jc.trees".to_string())))
    );
    assert_eq!(
        objects.get(run.loggers[1]).input("log"),
        Some(&Input::Objects(vec![run.state_nodes[1]]))
    );
}

#[test]
fn test_operator_weights() {
    let graph = yule_jc();
    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(10_000, 100, "yule_jc").unwrap();
    let objects = ctx.objects();

    // psi has three internal nodes
    let tree_operators: Vec<ObjectId> = run
        .operators
        .iter()
        .copied()
        .filter(|o| objects.id_of(*o).starts_with("psi."))
        .collect();
    assert_eq!(tree_operators.len(), 5);
    for operator in tree_operators {
        assert_eq!(real_input(objects, operator, "weight"), 3f64.powf(0.7));
    }
    assert_eq!(real_input(objects, run.operators[0], "weight"), operator_weight(1));
    assert_eq!(real_input(objects, run.operators[0], "scaleFactor"), 0.75);
}

#[test]
fn test_clamped_alignment_feeds_likelihood() {
    let graph = yule_jc();
    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(10_000, 100, "yule_jc").unwrap();

    let data = graph.get("D", Context::Data).unwrap();
    let model = graph.get("D", Context::Model).unwrap();
    assert!(ctx.is_clamped("D"));
    assert!(!ctx.is_clamped("lambda"));
    assert_eq!(ctx.clamped_value("D"), Some(data));
    assert_eq!(ctx.clamped_value("psi"), graph.get("psi", Context::Model));

    let likelihood = run.posterior.likelihoods[0];
    let wired = object_input(ctx.objects(), likelihood, "data");
    assert_eq!(Some(wired), ctx.beast_object(data));
    assert_ne!(Some(wired), ctx.beast_object(model));
    assert_eq!(ctx.graph_node(wired), Some(NodeRef::Value(data)));
}

#[test]
fn test_partition_is_exhaustive_and_disjoint() {
    let graph = yule_jc();
    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(10_000, 100, "yule_jc").unwrap();
    let objects = ctx.objects();

    let compounds = [run.posterior.prior, run.posterior.likelihood, run.posterior.posterior];
    let distributions: HashSet<ObjectId> = ctx
        .elements()
        .filter(|o| objects.get(*o).is_distribution() && !compounds.contains(o))
        .collect();
    let priors: HashSet<ObjectId> = run.posterior.priors.iter().copied().collect();
    let likelihoods: HashSet<ObjectId> = run.posterior.likelihoods.iter().copied().collect();

    assert!(priors.is_disjoint(&likelihoods));
    assert_eq!(&priors | &likelihoods, distributions);
    assert_eq!(
        objects.get(run.posterior.posterior).input("distribution"),
        Some(&Input::Objects(vec![run.posterior.prior, run.posterior.likelihood]))
    );
}

#[test]
fn test_translation_is_deterministic() {
    let graph = yule_jc();
    let mut first = context(&graph);
    let mut second = context(&graph);
    let a = first.create_mcmc(10_000, 100, "yule_jc").unwrap();
    let b = second.create_mcmc(10_000, 100, "yule_jc").unwrap();

    assert_eq!(ids(first.objects(), &a.operators), ids(second.objects(), &b.operators));
    assert_eq!(ids(first.objects(), &a.loggers), ids(second.objects(), &b.loggers));
    assert_eq!(
        beast_objects::to_xml(first.objects(), a.run).unwrap(),
        beast_objects::to_xml(second.objects(), b.run).unwrap()
    );
}

#[test]
fn test_shared_inputs_translate_once() {
    let mut graph = ModelGraph::new();
    let zero = graph.constant(Context::Model, Value::Double(0.0));
    let one = graph.constant(Context::Model, Value::Double(1.0));
    let x = graph
        .sample("Normal", [("mean", zero), ("sd", one)], "x", Value::Double(0.1))
        .unwrap();
    graph
        .sample("Normal", [("mean", x), ("sd", one)], "y", Value::Double(0.2))
        .unwrap();
    graph
        .sample("Normal", [("mean", x), ("sd", one)], "z", Value::Double(0.3))
        .unwrap();

    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(1000, 10, "shared").unwrap();
    let objects = ctx.objects();

    let x_object = ctx.beast_object(x).unwrap();
    assert_eq!(ids(objects, &run.state_nodes), vec!["x"]);
    assert_eq!(ids(objects, &run.posterior.priors), vec!["x.prior"]);
    assert_eq!(ids(objects, &run.posterior.likelihoods), vec!["y.prior", "z.prior"]);
    let x_params = objects
        .iter()
        .filter(|(_, o)| o.id() == Some("x"))
        .count();
    assert_eq!(x_params, 1);

    let sd_users: Vec<ObjectId> = run
        .posterior
        .priors
        .iter()
        .chain(&run.posterior.likelihoods)
        .map(|prior| object_input(objects, object_input(objects, *prior, "distr"), "sigma"))
        .collect();
    assert!(sd_users.iter().all(|sd| *sd == sd_users[0]));
    assert_eq!(ctx.beast_object(one), Some(sd_users[0]));
    assert_eq!(
        object_input(objects, object_input(objects, run.posterior.likelihoods[0], "distr"), "mean"),
        x_object
    );
}

#[test]
fn test_dirichlet_frequencies_use_delta_exchange() {
    let mut graph = ModelGraph::new();
    let conc = graph.constant(Context::Model, Value::DoubleArray(vec![1.0; 4]));
    let pi = graph
        .sample("Dirichlet", [("conc", conc)], "pi", Value::DoubleArray(vec![0.25; 4]))
        .unwrap();
    let kappa = graph.constant(Context::Model, Value::Double(2.0));
    let q = graph
        .compute(
            "HKY",
            [("kappa", kappa), ("freq", pi)],
            "Q",
            Value::DoubleMatrix(vec![vec![0.0; 4]; 4]),
        )
        .unwrap();
    let tree = model_graph::TimeTree::from_newick("((A:1.0,B:1.0):1.0,C:2.0);").unwrap();
    let psi = graph
        .add_value(Context::Model, "psi", Value::TimeTree(tree))
        .unwrap();
    let alignment = model_graph::Alignment::new(
        "nucleotide",
        [("A", "ACGT"), ("B", "ACGA"), ("C", "ACTT")]
            .into_iter()
            .map(|(t, s)| (t.to_string(), s.to_string()))
            .collect(),
    );
    graph
        .sample("PhyloCTMC", [("tree", psi), ("Q", q)], "D", Value::Alignment(alignment))
        .unwrap();

    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(1000, 10, "dirichlet").unwrap();
    let objects = ctx.objects();

    assert_eq!(ids(objects, &run.state_nodes), vec!["pi"]);
    assert_eq!(ids(objects, &run.operators), vec!["pi.deltaExchange"]);
    let operator = run.operators[0];
    assert_eq!(objects.get(operator).spec(), specs::DELTA_EXCHANGE_OPERATOR);
    assert_eq!(real_input(objects, operator, "delta"), 0.25);
    assert_eq!(real_input(objects, operator, "weight"), 3f64.powf(0.7));

    let ObjectKind::RealParameter(p) = objects.get(ctx.beast_object(pi).unwrap()).kind() else {
        panic!("pi should be a real parameter");
    };
    assert_eq!((p.lower, p.upper), (Some(0.0), Some(1.0)));
    assert_eq!(p.keys.as_ref().map(|k| k.join(" ")), Some("A C G T".to_string()));
}

#[test]
fn test_unconsumed_random_variable_is_not_state() {
    let mut graph = ModelGraph::new();
    let conc = graph.constant(Context::Model, Value::DoubleArray(vec![1.0; 4]));
    graph
        .sample("Dirichlet", [("conc", conc)], "pi", Value::DoubleArray(vec![0.25; 4]))
        .unwrap();

    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(1000, 10, "sink").unwrap();
    assert!(run.state_nodes.is_empty());
    assert!(run.operators.is_empty());
    assert_eq!(ids(ctx.objects(), &run.posterior.likelihoods), vec!["pi.prior"]);
}

#[test]
fn test_integer_parameter_is_coerced_for_real_inputs() {
    let mut graph = ModelGraph::new();
    let mean = graph.constant(Context::Model, Value::Integer(2));
    graph
        .sample("Exp", [("mean", mean)], "x", Value::Double(1.3))
        .unwrap();

    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(1000, 10, "exp").unwrap();
    let objects = ctx.objects();
    let distr = object_input(objects, run.posterior.likelihoods[0], "distr");
    let coerced = object_input(objects, distr, "mean");
    assert!(matches!(objects.get(coerced).kind(), ObjectKind::RealParameter(_)));
    assert_eq!(ctx.beast_object(mean), Some(coerced));

    let x = ctx.beast_object_by_id("x").unwrap();
    let ObjectKind::RealParameter(p) = objects.get(x).kind() else {
        panic!("x should be a real parameter");
    };
    assert_eq!(p.lower, Some(0.0));
}

#[test]
fn test_integer_random_variable_keeps_random_walk() {
    let mut graph = ModelGraph::new();
    let rate = graph.constant(Context::Model, Value::Double(3.0));
    let n = graph
        .sample("Poisson", [("lambda", rate)], "n", Value::Integer(2))
        .unwrap();
    let one = graph.constant(Context::Model, Value::Double(1.0));
    graph
        .sample("Normal", [("mean", n), ("sd", one)], "y", Value::Double(1.8))
        .unwrap();

    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(1000, 10, "poisson").unwrap();
    let objects = ctx.objects();
    let n_object = ctx.beast_object(n).unwrap();

    assert_eq!(run.state_nodes, vec![n_object]);
    assert!(matches!(objects.get(n_object).kind(), ObjectKind::IntegerParameter(_)));
    assert_eq!(ids(objects, &run.operators), vec!["n.randomWalk"]);
    let walk = run.operators[0];
    assert_eq!(objects.get(walk).spec(), specs::INT_RANDOM_WALK_OPERATOR);
    assert_eq!(objects.get(walk).input("parameter"), Some(&Input::Object(n_object)));
    assert_eq!(
        objects.get(walk).input("windowSize"),
        Some(&Input::Value(Primitive::Int(1)))
    );
    assert_eq!(real_input(objects, walk, "weight"), operator_weight(1));

    // the prior over n and the distribution reading n share one object
    assert_eq!(ids(objects, &run.posterior.priors), vec!["n.prior"]);
    assert_eq!(object_input(objects, run.posterior.priors[0], "x"), n_object);
    let y_distr = object_input(objects, run.posterior.likelihoods[0], "distr");
    assert_eq!(object_input(objects, y_distr, "mean"), n_object);

    let xml = beast_objects::to_xml(objects, run.run).unwrap();
    assert_eq!(xml.matches(r#" id="n""#).count(), 1);
}

#[test]
fn test_integer_array_feeding_rate_stays_integer() {
    let mut graph = ModelGraph::new();
    let rate = graph.constant(Context::Model, Value::Double(4.0));
    let k = graph
        .sample("Poisson", [("lambda", rate)], "k", Value::IntegerArray(vec![3, 5, 4]))
        .unwrap();
    graph
        .sample("Poisson", [("lambda", k)], "z", Value::IntegerArray(vec![2, 6, 4]))
        .unwrap();

    let mut ctx = context(&graph);
    let xml = ctx.to_beast_xml("counts").unwrap();
    let objects = ctx.objects();
    let k_object = ctx.beast_object(k).unwrap();

    assert_eq!(ctx.state_nodes(), &[k_object]);
    assert_eq!(objects.get(k_object).spec(), specs::INTEGER_PARAMETER);
    let walk = ctx.beast_object_by_id("k.randomWalk").unwrap();
    assert_eq!(real_input(objects, walk, "weight"), operator_weight(3));
    assert!(ctx.beast_object_by_id("k.scale").is_none());
    assert_eq!(xml.matches(r#" id="k""#).count(), 1);
}

/// Prior over the generator's output with a placeholder distribution.
struct PlaceholderPrior(&'static str);

impl GeneratorToBeast for PlaceholderPrior {
    fn generator_kind(&self) -> GeneratorKind {
        GeneratorKind::from_static(self.0)
    }

    fn generator_to_beast(
        &self,
        _generator: GeneratorId,
        value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<Option<ObjectId>, TranslationError> {
        let objects = ctx.objects_mut();
        let distr = objects.add(BeastObject::new(format!("test.{}", self.0), ObjectKind::Plain));
        Ok(Some(objects.prior(distr, value)))
    }
}

struct ExtraTranslators;

impl TranslatorPlugin for ExtraTranslators {
    fn name(&self) -> &str {
        "extra"
    }

    fn value_translators(&self) -> Vec<Rc<dyn ValueToBeast>> {
        Vec::new()
    }

    fn generator_translators(&self) -> Vec<Rc<dyn GeneratorToBeast>> {
        ["RandomComposition", "Bernoulli", "Label"]
            .into_iter()
            .map(|kind| Rc::new(PlaceholderPrior(kind)) as Rc<dyn GeneratorToBeast>)
            .collect()
    }
}

fn extra_plugin() -> anyhow::Result<Box<dyn TranslatorPlugin>> {
    Ok(Box::new(ExtraTranslators))
}

fn extended_context(graph: &ModelGraph, options: Options) -> BeastContext<'_> {
    let factories: [PluginFactory; 2] = [lphy_beast::translators::standard_plugin, extra_plugin];
    BeastContext::new(graph, Rc::new(TranslatorRegistry::from_plugins(&factories)), options)
}

fn excluding(kind: &str) -> Options {
    Options {
        excluded_generators: vec![kind.to_string()],
        ..Options::default()
    }
}

#[test]
fn test_composition_and_boolean_operators() {
    let mut graph = ModelGraph::new();
    let total = graph.constant(Context::Model, Value::Integer(10));
    let parts = graph.constant(Context::Model, Value::Integer(3));
    let c = graph
        .sample(
            "RandomComposition",
            [("n", total), ("k", parts)],
            "c",
            Value::IntegerArray(vec![2, 3, 5]),
        )
        .unwrap();
    let p = graph.constant(Context::Model, Value::Double(0.5));
    let b = graph
        .sample("Bernoulli", [("p", p)], "b", Value::BooleanArray(vec![true, false, true]))
        .unwrap();
    graph
        .compute("Sum", [("c", c), ("b", b)], "s", Value::Integer(12))
        .unwrap();

    let mut ctx = extended_context(&graph, excluding("Sum"));
    let run = ctx.create_mcmc(1000, 10, "composition").unwrap();
    let objects = ctx.objects();
    let (c_object, b_object) = (ctx.beast_object(c).unwrap(), ctx.beast_object(b).unwrap());

    assert_eq!(run.state_nodes, vec![c_object, b_object]);
    assert_eq!(ids(objects, &run.operators), vec!["b.bitFlip", "c.deltaExchange"]);

    let flip = run.operators[0];
    assert_eq!(objects.get(flip).spec(), specs::BIT_FLIP_OPERATOR);
    assert_eq!(objects.get(flip).input("parameter"), Some(&Input::Object(b_object)));
    assert_eq!(real_input(objects, flip, "weight"), operator_weight(3));

    let exchange = run.operators[1];
    assert_eq!(objects.get(exchange).spec(), specs::DELTA_EXCHANGE_OPERATOR);
    assert_eq!(objects.get(exchange).input("intparameter"), Some(&Input::Object(c_object)));
    assert_eq!(real_input(objects, exchange, "delta"), 2.0);
    assert_eq!(
        objects.get(exchange).input("integer"),
        Some(&Input::Value(Primitive::Bool(true)))
    );
    assert_eq!(real_input(objects, exchange, "weight"), operator_weight(2));
    assert_eq!(ids(objects, &run.posterior.priors), vec!["c.prior", "b.prior"]);
}

#[test]
fn test_each_tree_gets_its_own_log() {
    let mut graph = ModelGraph::new();
    let birth = graph.constant(Context::Model, Value::Double(2.0));
    let tree = || Value::TimeTree(TimeTree::from_newick("((A:1.0,B:1.0):1.0,C:2.0);").unwrap());
    let t2 = graph.sample("Yule", [("lambda", birth)], "t2", tree()).unwrap();
    let t1 = graph.sample("Yule", [("lambda", birth)], "t1", tree()).unwrap();
    graph
        .compute("Compare", [("first", t2), ("second", t1)], "same", Value::Boolean(false))
        .unwrap();

    let mut ctx = extended_context(&graph, excluding("Compare"));
    let run = ctx.create_mcmc(1000, 10, "p").unwrap();
    let objects = ctx.objects();

    assert_eq!(ids(objects, &run.state_nodes), vec!["t2", "t1"]);
    assert_eq!(
        ids(objects, &run.loggers),
        vec!["screenlog", "tracelog", "t1.treeLogger", "t2.treeLogger"]
    );
    let file_name = |logger: ObjectId| objects.get(logger).input("fileName").cloned();
    let text = |s: &str| Some(Input::Value(Primitive::Text(s.to_string())));
    assert_eq!(file_name(run.loggers[2]), text("p_t1.trees"));
    assert_eq!(file_name(run.loggers[3]), text("p_t2.trees"));
    assert_eq!(
        objects.get(run.loggers[2]).input("log"),
        Some(&Input::Object(ctx.beast_object(t1).unwrap()))
    );
    assert_eq!(
        objects.get(run.loggers[1]).input("log"),
        Some(&Input::Objects(Vec::new()))
    );
    assert_eq!(run.operators.len(), 10);
}

#[test]
fn test_generator_without_output_object_is_unresolved() {
    let mut graph = ModelGraph::new();
    let x = graph.constant(Context::Model, Value::Double(1.0));
    graph
        .compute("Label", [("x", x)], "name", Value::Str("tip".to_string()))
        .unwrap();

    let mut ctx = extended_context(&graph, Options::default());
    assert!(matches!(
        ctx.create_mcmc(1000, 10, "label"),
        Err(TranslationError::UnresolvedGenerator { kind, output, .. })
            if kind == "Label" && output == "name"
    ));

    let mut ctx = extended_context(&graph, excluding("Label"));
    assert!(ctx.create_mcmc(1000, 10, "label").is_ok());
}

fn alignment_model(data_type: &str) -> ModelGraph {
    let sequences = [("A", "ACGT"), ("B", "ACGA")]
        .into_iter()
        .map(|(t, s)| (t.to_string(), s.to_string()))
        .collect();
    let mut graph = ModelGraph::new();
    graph
        .add_value(Context::Model, "D", Value::Alignment(Alignment::new(data_type, sequences)))
        .unwrap();
    graph
}

#[test]
fn test_alignment_data_type_is_mapped() {
    let graph = alignment_model("DNA");
    let mut ctx = context(&graph);
    let xml = ctx.to_beast_xml("dna").unwrap();
    let alignment = ctx.beast_object_by_id("D").unwrap();
    assert_eq!(
        ctx.objects().get(alignment).input("dataType"),
        Some(&Input::Value(Primitive::Text("nucleotide".to_string())))
    );
    assert!(!xml.contains(r#"dataType="DNA""#));

    let graph = alignment_model("rna");
    let mut ctx = context(&graph);
    assert!(matches!(
        ctx.create_mcmc(1000, 10, "rna"),
        Err(TranslationError::UnresolvedDataType { data_type, .. }) if data_type == "rna"
    ));
}

/// Scans the XML for elements, returning the defined ids and each element's children.
fn scan(xml: &str) -> (Vec<String>, HashMap<String, Vec<String>>) {
    let tag = Regex::new(r#"<(/?)([\w.]+)((?:\s+[\w.:]+="[^"]*")*)\s*(/?)>"#).unwrap();
    let attribute = Regex::new(r#"([\w.:]+)="([^"]*)""#).unwrap();

    let mut defined = Vec::new();
    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    let mut open: Vec<String> = Vec::new();
    for captures in tag.captures_iter(xml) {
        let name = &captures[2];
        if name == "beast" {
            continue;
        }
        if &captures[1] == "/" {
            open.pop();
            continue;
        }
        let attributes: HashMap<&str, &str> = attribute
            .captures_iter(captures.get(3).map_or("", |m| m.as_str()))
            .map(|a| (a.get(1).unwrap().as_str(), a.get(2).unwrap().as_str()))
            .collect();
        let id = match (attributes.get("id"), attributes.get("idref")) {
            (Some(id), _) => {
                defined.push(id.to_string());
                id.to_string()
            }
            (None, Some(idref)) => idref.to_string(),
            (None, None) => panic!("element `{}` has neither id nor idref", name),
        };
        if let Some(parent) = open.last() {
            children.entry(parent.clone()).or_default().push(id.clone());
        }
        let self_closing = &captures[4] == "/";
        if !self_closing {
            open.push(id);
        }
    }
    (defined, children)
}

#[test]
fn test_xml_round_trip_preserves_structure() {
    let graph = yule_jc();
    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(10_000, 100, "yule_jc").unwrap();
    let xml = beast_objects::to_xml(ctx.objects(), run.run).unwrap();
    let (defined, children) = scan(&xml);

    let unique: HashSet<&String> = defined.iter().collect();
    assert_eq!(unique.len(), defined.len());
    for refs in children.values() {
        assert!(refs.iter().all(|r| unique.contains(r)));
    }

    // every named object reachable from the run keeps its references
    let objects = ctx.objects();
    let mut stack = vec![run.run];
    let mut seen = HashSet::new();
    while let Some(object) = stack.pop() {
        if !seen.insert(object) {
            continue;
        }
        let references: Vec<ObjectId> = objects.get(object).references().collect();
        stack.extend(references.iter().copied());
        let Some(id) = objects.get(object).id() else {
            continue;
        };
        assert!(unique.contains(&id.to_string()), "`{}` missing from xml", id);
        let written = children.get(id).cloned().unwrap_or_default();
        assert_eq!(written.len(), references.len(), "children of `{}`", id);
        for reference in references {
            if let Some(child) = objects.get(reference).id() {
                assert!(written.iter().any(|w| w == child), "`{}` -> `{}`", id, child);
            }
        }
    }
    assert_eq!(Regex::new(r#" id="D""#).unwrap().find_iter(&xml).count(), 1);
}

#[test]
fn test_to_beast_xml_uses_configured_chain() {
    let graph = yule_jc();
    let options = Options {
        chain_length: 5000,
        log_every: 50,
        ..Options::default()
    };
    let mut ctx = BeastContext::new(&graph, Rc::new(TranslatorRegistry::standard()), options);
    let xml = ctx.to_beast_xml("yule_jc").unwrap();
    assert!(xml.contains(r#"<run id="mcmc" spec="beast.core.MCMC" chainLength="5000""#));
    assert!(xml.contains(r#"logEvery="50""#));
    assert!(xml.contains(r#"fileName="yule_jc.log""#));
}

struct RecordingRunner {
    runs: Cell<usize>,
}

impl McmcRunner for RecordingRunner {
    fn run(&self, objects: &BeastGraph, run: &McmcRun) -> anyhow::Result<()> {
        assert_eq!(objects.get(run.run).spec(), specs::MCMC);
        self.runs.set(self.runs.get() + 1);
        Ok(())
    }
}

#[test]
fn test_run_beast_hands_run_to_runner() {
    let graph = yule_jc();
    let mut ctx = context(&graph);
    let runner = RecordingRunner { runs: Cell::new(0) };
    ctx.run_beast(&runner, "yule_jc").unwrap();
    assert_eq!(runner.runs.get(), 1);
}

#[test]
fn test_context_must_be_cleared_before_reuse() {
    let graph = yule_jc();
    let mut ctx = context(&graph);
    let first = ctx.create_mcmc(1000, 10, "a").unwrap();
    assert!(matches!(
        ctx.create_mcmc(1000, 10, "a"),
        Err(TranslationError::StaleContext)
    ));

    ctx.clear();
    assert!(ctx.elements().next().is_none());
    let second = ctx.create_mcmc(1000, 10, "a").unwrap();
    assert_eq!(second.operators.len(), first.operators.len());
}

#[test]
fn test_unresolved_generator_poisons_context() {
    let mut graph = ModelGraph::new();
    let shape = graph.constant(Context::Model, Value::Double(1.5));
    graph
        .sample("Mystery", [("shape", shape)], "x", Value::Double(0.7))
        .unwrap();

    let mut ctx = context(&graph);
    let err = ctx.create_mcmc(1000, 10, "x").unwrap_err();
    assert!(matches!(
        &err,
        TranslationError::UnresolvedGenerator { kind, output, .. } if kind == "Mystery" && output == "x"
    ));
    assert!(matches!(
        ctx.create_mcmc(1000, 10, "x"),
        Err(TranslationError::StaleContext)
    ));
    ctx.clear();
    assert!(matches!(
        ctx.create_mcmc(1000, 10, "x"),
        Err(TranslationError::UnresolvedGenerator { .. })
    ));
}

#[test]
fn test_unresolved_value() {
    let mut graph = ModelGraph::new();
    graph
        .add_value(Context::Model, "x", Value::Double(1.0))
        .unwrap();
    let mut ctx = BeastContext::new(&graph, Rc::new(TranslatorRegistry::new()), Options::default());
    assert!(matches!(
        ctx.create_mcmc(1000, 10, "x"),
        Err(TranslationError::UnresolvedValue { id, .. }) if id == "x"
    ));
}

#[test]
fn test_excluded_nodes_are_tolerated() {
    let mut graph = ModelGraph::new();
    graph
        .add_value(Context::Model, "file", Value::Str("Dengue4.nex".to_string()))
        .unwrap();
    let file = graph.get("file", Context::Model).unwrap();
    graph
        .compute("ntaxa", [("alignment", file)], "n", Value::Integer(17))
        .unwrap();

    let mut ctx = context(&graph);
    let run = ctx.create_mcmc(1000, 10, "excluded").unwrap();
    assert!(run.posterior.priors.is_empty());
    assert!(ctx.beast_object(file).is_none());
    assert!(ctx.beast_object_by_id("n").is_some());
}

fn failing_plugin() -> anyhow::Result<Box<dyn TranslatorPlugin>> {
    anyhow::bail!("BEAST package not installed")
}

#[test]
fn test_failing_plugin_is_skipped() {
    let factories: [PluginFactory; 2] = [failing_plugin, lphy_beast::translators::standard_plugin];
    let registry = TranslatorRegistry::from_plugins(&factories);
    let standard = TranslatorRegistry::standard();
    assert_eq!(
        registry.generator_kinds().count(),
        standard.generator_kinds().count()
    );
    assert!(registry
        .lookup_generator(&GeneratorKind::from("Yule"))
        .is_some());
}

#[test]
fn test_registry_falls_back_to_supertype() {
    struct NumberToBeast;

    impl ValueToBeast for NumberToBeast {
        fn value_type(&self) -> model_graph::ValueType {
            model_graph::ValueType::Number
        }

        fn value_to_beast(
            &self,
            value: model_graph::ValueId,
            ctx: &mut BeastContext<'_>,
        ) -> Result<ObjectId, TranslationError> {
            let x = ctx.graph().value(value).value().as_f64().unwrap_or_default();
            let id = ctx.graph().value(value).id();
            Ok(ctx.objects_mut().real_parameter(id, vec![x]))
        }
    }

    let mut registry = TranslatorRegistry::new();
    registry.register_value(Rc::new(NumberToBeast));

    let mut graph = ModelGraph::new();
    let n = graph
        .add_value(Context::Model, "n", Value::Integer(3))
        .unwrap();
    let mut ctx = BeastContext::new(&graph, Rc::new(registry), Options::default());
    ctx.create_mcmc(1000, 10, "n").unwrap();
    let object = ctx.beast_object(n).unwrap();
    assert!(matches!(
        ctx.objects().get(object).kind(),
        ObjectKind::RealParameter(_)
    ));
}

#[test]
fn test_taxa_are_shared() {
    let graph = yule_jc();
    let mut ctx = context(&graph);
    ctx.create_mcmc(1000, 10, "yule_jc").unwrap();

    let a = ctx.taxon("A");
    assert_eq!(ctx.taxon("A"), a);
    assert_eq!(ctx.create_taxon_list(["B", "A"])[1], a);
    assert_eq!(ctx.alignments().len(), 2);
}
