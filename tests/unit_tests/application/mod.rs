
mod research_orchestrator_test;
