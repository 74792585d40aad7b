mod gemini_tests;
mod twitter_tests;
