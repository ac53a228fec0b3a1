// Task prompts of the three structuring stages. Each asks for one JSON object
// whose keys are fields of the CV record.

/// Identity, about, skills, certifications, languages.
pub const IDENTITY_PROMPT: &str = r#"Analyse attentivement ce CV et extrais ces informations.
Le nom et le prénom figurent généralement tout en haut du CV, souvent en titre.
Cherche le vrai nom de la personne ; n'écris jamais "Prénom NOM" comme valeur.
Si une information est absente, mets null ou une liste vide.

Retourne exactement ce JSON :
{
  "nom_prenom": "NOM ET PRÉNOM",
  "titre_poste": "Titre du poste actuel ou recherché",
  "annees_experience": "X ans d'expérience (calculé à partir des dates)",
  "a_propos": "Résumé du CV copié tel quel s'il existe, sinon 2 à 3 phrases professionnelles fidèles au profil",
  "competences": [{"categorie": "Catégorie", "items": ["item1", "item2"]}],
  "certifications": ["cert1", "cert2"],
  "langues": ["Français", "Anglais"]
}"#;

/// Every work experience, most recent first as written in the CV.
pub const EXPERIENCES_PROMPT: &str = r#"Extrais TOUTES les expériences professionnelles du CV, dans l'ordre où elles apparaissent.
Ne fusionne pas deux postes distincts. Laisse vides les champs absents du CV.

Retourne exactement ce JSON :
{
  "experiences": [
    {
      "periode": "2022 – 2024",
      "entreprise": "NOM ENTREPRISE",
      "poste": "Titre du poste",
      "direction": "",
      "contexte": "Contexte de la mission",
      "objectifs": [],
      "missions": ["mission1", "mission2"],
      "realisations": ["Libellé : réalisation1"],
      "resultats": [],
      "environnement": "Technologies utilisées"
    }
  ]
}"#;

/// Education, notable projects and other references.
pub const EDUCATION_PROMPT: &str = r#"Extrais la formation, les projets marquants et les autres références du CV.

Retourne exactement ce JSON :
{
  "formations": [{"annee": "2020", "diplome": "Diplôme", "etablissement": "École"}],
  "projets_marquants": ["projet1", "projet2"],
  "autres_references": [{"entreprise": "Entreprise", "poste": "Poste"}]
}"#;
